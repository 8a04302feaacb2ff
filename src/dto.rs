use serde::Serialize;

/// List envelope: `{ "count": n, "results": [...] }`.
#[derive(Debug, Serialize)]
pub struct ResponseWrapper<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> ResponseWrapper<T> {
    pub fn of<I, U>(items: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<T>,
    {
        let results: Vec<T> = items.into_iter().map(Into::into).collect();
        Self {
            count: results.len(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_results() {
        let w: ResponseWrapper<String> = ResponseWrapper::of(vec!["a", "b"]);
        assert_eq!(w.count, 2);
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"count":2,"results":["a","b"]}"#);
    }
}
