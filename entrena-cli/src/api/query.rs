/// Filtered read/write target on a backend table, in the REST dialect
/// (`col=eq.value`, `col=in.("a","b")`, `order=col.desc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    params: Vec<(String, String)>,
    empty_in: bool,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            params: Vec::new(),
            empty_in: false,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.retain(|(k, _)| k != "select");
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.as_ref())));
        self
    }

    /// `column IN (values)`. An empty list matches no rows.
    pub fn in_list<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let quoted: Vec<String> = values
            .into_iter()
            .map(|v| format!("\"{}\"", v.as_ref().replace('"', "\\\"")))
            .collect();

        if quoted.is_empty() {
            self.empty_in = true;
        }

        self.params
            .push((column.to_string(), format!("in.({})", quoted.join(","))));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.params
            .push(("order".to_string(), format!("{}.desc", column)));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.params
            .push(("order".to_string(), format!("{}.asc", column)));
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// True when an `in` filter has no values; such a query can skip the network
    pub fn matches_nothing(&self) -> bool {
        self.empty_in
    }

    pub fn has_filters(&self) -> bool {
        self.params
            .iter()
            .any(|(k, _)| k != "select" && k != "order")
    }
}
