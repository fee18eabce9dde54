use sea_orm::{
    ColumnTrait,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

/// Escape character appended as `ESCAPE '\'` to every substring search.
pub const LIKE_ESCAPE: char = '\\';

/// Longest search value (in characters) that is matched at all.
pub const MAX_SEARCH_VALUE_LENGTH: usize = 1024;

/// Escape LIKE wildcards so user input only ever matches literally.
/// Backslash is escaped first, then `%` and `_`.
#[must_use]
pub fn escape_like_wildcards(input: &str) -> String {
    input
        .replace(LIKE_ESCAPE, "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Build `UPPER(column) LIKE '%VALUE%' ESCAPE '\'` with the wildcards in
/// `value` escaped, so matching is case-insensitive on every backend. The
/// pattern is bound as a parameter.
///
/// Returns `None` for an empty (or whitespace-only) value, which callers
/// treat as "no predicate". A value longer than
/// [`MAX_SEARCH_VALUE_LENGTH`] yields a predicate that matches no row.
#[must_use]
pub fn build_like_condition<C: ColumnTrait>(column: C, value: &str) -> Option<SimpleExpr> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() > MAX_SEARCH_VALUE_LENGTH {
        tracing::debug!(
            column = ?column,
            length = trimmed.chars().count(),
            "search value too long, matching nothing"
        );
        return Some(Expr::cust("1 = 0"));
    }
    let pattern = format!("%{}%", escape_like_wildcards(trimmed).to_uppercase());
    Some(
        Expr::expr(Func::upper(Expr::col((column.entity_name(), column))))
            .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
    )
}
