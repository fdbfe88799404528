//! Query options for read and delete calls.

/// Which properties, associations and page to request.
///
/// Property names are passed through unvalidated; the remote API ignores
/// names it does not recognise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOption {
    pub properties: Vec<String>,
    /// Appended to the resolved property list, defaults included.
    pub custom_properties: Vec<String>,
    pub associations: Vec<String>,
    pub paginate_associations: bool,
    pub archived: bool,
    pub id_property: Option<String>,
    pub limit: Option<u32>,
    pub after: Option<String>,
}

impl QueryOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_custom_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_associations<I, S>(mut self, associations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associations = associations.into_iter().map(Into::into).collect();
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    /// Resolve the property list: an explicit non-empty list is kept verbatim,
    /// otherwise `defaults` is used. Custom properties are appended either way.
    pub fn setup_properties(mut self, defaults: &[&str]) -> Self {
        if self.properties.is_empty() {
            self.properties = defaults.iter().map(|s| s.to_string()).collect();
        }
        let custom = std::mem::take(&mut self.custom_properties);
        self.properties.extend(custom);
        self
    }

    /// Query parameters in the order the remote expects them.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if !self.properties.is_empty() {
            query.push(("properties".to_string(), self.properties.join(",")));
        }
        if !self.associations.is_empty() {
            query.push(("associations".to_string(), self.associations.join(",")));
        }
        if self.paginate_associations {
            query.push(("paginateAssociations".to_string(), "true".to_string()));
        }
        if self.archived {
            query.push(("archived".to_string(), "true".to_string()));
        }
        if let Some(id_property) = &self.id_property {
            query.push(("idProperty".to_string(), id_property.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(after) = &self.after {
            query.push(("after".to_string(), after.clone()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: &[&str] = &["email", "firstname"];

    #[test]
    fn empty_properties_fall_back_to_defaults() {
        let opt = QueryOption::new().setup_properties(DEFAULTS);
        assert_eq!(opt.properties, vec!["email", "firstname"]);
    }

    #[test]
    fn explicit_properties_win_regardless_of_defaults() {
        let opt = QueryOption::new()
            .with_properties(["a", "b"])
            .setup_properties(DEFAULTS);
        assert_eq!(opt.properties, vec!["a", "b"]);
    }

    #[test]
    fn unknown_names_pass_through() {
        let opt = QueryOption::new()
            .with_properties(["does_not_exist"])
            .setup_properties(DEFAULTS);
        assert_eq!(opt.properties, vec!["does_not_exist"]);
    }

    #[test]
    fn custom_properties_are_appended_to_defaults() {
        let opt = QueryOption::new()
            .with_custom_properties(["custom_a"])
            .setup_properties(DEFAULTS);
        assert_eq!(opt.properties, vec!["email", "firstname", "custom_a"]);
        assert!(opt.custom_properties.is_empty());
    }

    #[test]
    fn default_option_encodes_to_nothing() {
        assert!(QueryOption::new().to_query().is_empty());
    }

    #[test]
    fn query_encoding() {
        let opt = QueryOption::new()
            .with_properties(["email", "phone"])
            .with_associations(["companies"])
            .archived(true)
            .with_limit(10)
            .with_after("abc");
        assert_eq!(
            opt.to_query(),
            vec![
                ("properties".to_string(), "email,phone".to_string()),
                ("associations".to_string(), "companies".to_string()),
                ("archived".to_string(), "true".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("after".to_string(), "abc".to_string()),
            ]
        );
    }
}
