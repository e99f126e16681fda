//! SQL builder for location search
//!
//! Pure functions producing `(sql, params)` so the generated query can be
//! asserted without a database. Column names never come from user input;
//! only values are bound.

use crate::data::types::{LocationSearchParams, RatingRange};
use crate::utils::sql::contains_pattern;

/// Bound parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
}

/// Accumulated bind parameters, in placeholder order
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

impl SqlParams {
    fn text(&mut self, value: impl Into<String>) {
        self.values.push(SqlValue::Text(value.into()));
    }

    fn int(&mut self, value: i64) {
        self.values.push(SqlValue::Int(value));
    }
}

/// Column whitelists
pub mod columns {
    /// Rating dimensions accepted as range filters
    pub const RATING_RANGE: &[&str] = &[
        "score",
        "noise",
        "cleanliness",
        "equipment_quality",
        "wifi_strength",
    ];
}

/// Location columns with campus and parent building resolved
pub const LOCATION_SELECT: &str = "SELECT DISTINCT l.id, l.university_id, l.campus_id, c.name AS campus_name, \
     l.name, l.kind, r.building_id, b.name AS building_name, r.room_number, r.room_type, r.room_size \
     FROM location l \
     JOIN campus c ON c.id = l.campus_id \
     LEFT JOIN rooms r ON r.location_id = l.id \
     LEFT JOIN location b ON b.id = r.building_id";

/// `col IN (?, ?, ...)` for the given text values, or `1=1` when empty
pub fn build_in_filter(col: &str, values: &[&str], params: &mut SqlParams) -> String {
    if values.is_empty() {
        return "1=1".to_string();
    }
    let placeholders: Vec<&str> = values
        .iter()
        .map(|v| {
            params.text(*v);
            "?"
        })
        .collect();
    format!("{} IN ({})", col, placeholders.join(", "))
}

/// `alias.col BETWEEN ? AND ?` for a whitelisted rating column
pub fn build_range_filter(
    alias: &str,
    col: &str,
    range: RatingRange,
    params: &mut SqlParams,
) -> Option<String> {
    if !columns::RATING_RANGE.contains(&col) {
        return None;
    }
    params.int(range.min);
    params.int(range.max);
    Some(format!("{}.{} BETWEEN ? AND ?", alias, col))
}

/// Build the location search query
///
/// Rating ranges and tag filters all constrain the same joined rating row,
/// so a location matches when one of its ratings satisfies all of them.
pub fn build_location_search(search: &LocationSearchParams) -> (String, SqlParams) {
    let mut params = SqlParams::default();
    let mut joins: Vec<&str> = Vec::new();
    let mut conditions: Vec<String> = Vec::new();

    if search.needs_ratings() {
        joins.push("JOIN ratings rt ON rt.location_id = l.id");
    }
    if !search.equipment_tags.is_empty() {
        joins.push("JOIN rating_equipment re ON re.rating_id = rt.id");
    }
    if !search.accessibility_tags.is_empty() {
        joins.push("JOIN rating_accessibility ra ON ra.rating_id = rt.id");
    }

    params.int(search.university_id);
    conditions.push("l.university_id = ?".to_string());

    if let Some(q) = search.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        params.text(contains_pattern(q));
        conditions.push("l.name LIKE ? ESCAPE '\\'".to_string());
    }
    if let Some(campus) = search.campus.as_deref() {
        params.text(campus);
        conditions.push("c.name = ?".to_string());
    }
    if let Some(building) = search.building.as_deref() {
        params.text(building);
        params.text(building);
        conditions.push("(b.name = ? OR (l.kind = 'building' AND l.name = ?))".to_string());
    }
    if let Some(number) = search.room_number.as_deref() {
        params.text(number);
        conditions.push("r.room_number = ?".to_string());
    }

    let kinds: Vec<&str> = search.kinds.iter().map(|k| k.as_str()).collect();
    let sizes: Vec<&str> = search.room_sizes.iter().map(|s| s.as_str()).collect();
    let types: Vec<&str> = search.room_types.iter().map(|t| t.as_str()).collect();
    let equipment: Vec<&str> = search.equipment_tags.iter().map(|t| t.as_str()).collect();
    let accessibility: Vec<&str> = search.accessibility_tags.iter().map(|t| t.as_str()).collect();

    for (col, values) in [
        ("l.kind", &kinds),
        ("r.room_size", &sizes),
        ("r.room_type", &types),
        ("re.tag", &equipment),
        ("ra.tag", &accessibility),
    ] {
        if !values.is_empty() {
            conditions.push(build_in_filter(col, values, &mut params));
        }
    }

    for (col, range) in search.ratings.specified() {
        if let Some(cond) = build_range_filter("rt", col, range, &mut params) {
            conditions.push(cond);
        }
    }

    params.int(search.limit);

    let mut sql = String::from(LOCATION_SELECT);
    for join in joins {
        sql.push(' ');
        sql.push_str(join);
    }
    sql.push_str(" WHERE ");
    sql.push_str(&conditions.join(" AND "));
    sql.push_str(" ORDER BY l.name, l.id LIMIT ?");

    (sql, params)
}
