use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Common list query parameters. Values arrive as raw strings so malformed
/// input coerces to defaults instead of failing extraction with a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl PageParams {
    pub fn from_query(query: &ListQuery, default_sort: &str) -> Self {
        Self::from_query_capped(query, default_sort, MAX_LIMIT)
    }

    pub fn from_query_capped(query: &ListQuery, default_sort: &str, max_limit: i64) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        let limit = query
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(max_limit);

        let sort_order = match query.sort_order.as_deref() {
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Desc,
        };

        let sort_by = query
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_sort)
            .to_string();

        PageParams {
            page,
            limit,
            offset: (page - 1) * limit,
            sort_by,
            sort_order,
        }
    }
}

#[derive(Debug)]
enum Clause {
    Eq {
        column: &'static str,
        value: String,
    },
    SearchAny {
        columns: &'static [&'static str],
        pattern: String,
    },
}

/// A conjunction of filter clauses rendered to SQL text plus an ordered bind
/// list. Pure data: nothing here touches the database, so a text search can
/// be merged with discriminator filters before a single count/fetch pair.
#[derive(Debug, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Filter { clauses: Vec::new() }
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Eq {
            column,
            value: value.into(),
        });
        self
    }

    /// Case-insensitive substring match over any of the given columns,
    /// sharing one bind parameter.
    pub fn search(mut self, columns: &'static [&'static str], term: &str) -> Self {
        self.clauses.push(Clause::SearchAny {
            columns,
            pattern: format!("%{term}%"),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render to a `" WHERE …"` fragment (empty string when no clauses) with
    /// placeholders numbered from `first_placeholder`. Each clause consumes
    /// exactly one placeholder, so the bind list lines up by position.
    pub fn to_sql(&self, first_placeholder: usize) -> (String, Vec<String>) {
        if self.clauses.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut parts = Vec::with_capacity(self.clauses.len());
        let mut binds = Vec::with_capacity(self.clauses.len());

        for (i, clause) in self.clauses.iter().enumerate() {
            let ph = first_placeholder + i;
            match clause {
                Clause::Eq { column, value } => {
                    parts.push(format!("{column} = ${ph}"));
                    binds.push(value.clone());
                }
                Clause::SearchAny { columns, pattern } => {
                    let ors: Vec<String> =
                        columns.iter().map(|c| format!("{c} ILIKE ${ph}")).collect();
                    parts.push(format!("({})", ors.join(" OR ")));
                    binds.push(pattern.clone());
                }
            }
        }

        (format!(" WHERE {}", parts.join(" AND ")), binds)
    }
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        PageMeta {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}
