//! Topic taxonomy for the SQL tutor.
//!
//! Topics are the first key of the blueprint store. They follow the order in
//! which the tutor introduces SQL concepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// The SQL topics a practice session can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    Basics,
    Filtering,
    Sorting,
    Aggregation,
    Grouping,
    Joins,
    Subqueries,
    Modification,
    Schema,
}

impl Topic {
    /// Returns all topics in curriculum order.
    pub fn all() -> Vec<Topic> {
        vec![
            Topic::Basics,
            Topic::Filtering,
            Topic::Sorting,
            Topic::Aggregation,
            Topic::Grouping,
            Topic::Joins,
            Topic::Subqueries,
            Topic::Modification,
            Topic::Schema,
        ]
    }

    /// Returns the kebab-case key used in blueprint files and exercise ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Basics => "basics",
            Topic::Filtering => "filtering",
            Topic::Sorting => "sorting",
            Topic::Aggregation => "aggregation",
            Topic::Grouping => "grouping",
            Topic::Joins => "joins",
            Topic::Subqueries => "subqueries",
            Topic::Modification => "modification",
            Topic::Schema => "schema",
        }
    }

    /// Returns a human-readable name for this topic.
    pub fn display_name(&self) -> &'static str {
        match self {
            Topic::Basics => "SELECT Basics",
            Topic::Filtering => "Filtering with WHERE",
            Topic::Sorting => "Sorting and Limiting",
            Topic::Aggregation => "Aggregate Functions",
            Topic::Grouping => "GROUP BY and HAVING",
            Topic::Joins => "Joins",
            Topic::Subqueries => "Subqueries",
            Topic::Modification => "INSERT, UPDATE and DELETE",
            Topic::Schema => "Schema Definition",
        }
    }

    /// Returns the SQL keywords this topic introduces.
    pub fn keywords(&self) -> Vec<&'static str> {
        match self {
            Topic::Basics => vec!["SELECT", "FROM", "AS", "DISTINCT"],
            Topic::Filtering => vec!["WHERE", "AND", "OR", "IN", "BETWEEN", "LIKE", "IS NULL"],
            Topic::Sorting => vec!["ORDER BY", "ASC", "DESC", "LIMIT", "OFFSET"],
            Topic::Aggregation => vec!["COUNT", "SUM", "AVG", "MIN", "MAX"],
            Topic::Grouping => vec!["GROUP BY", "HAVING"],
            Topic::Joins => vec!["INNER JOIN", "LEFT JOIN", "ON", "USING"],
            Topic::Subqueries => vec!["IN", "EXISTS", "ANY", "ALL"],
            Topic::Modification => vec!["INSERT INTO", "VALUES", "UPDATE", "SET", "DELETE"],
            Topic::Schema => vec!["CREATE TABLE", "ALTER TABLE", "PRIMARY KEY", "FOREIGN KEY"],
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Topic::all()
            .into_iter()
            .find(|topic| topic.as_str() == wanted)
            .ok_or(TemplateError::UnknownTopic(wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_all() {
        let all = Topic::all();
        assert_eq!(all.len(), 9);
        assert_eq!(all[0], Topic::Basics);
    }

    #[test]
    fn test_from_str_roundtrips_as_str() {
        for topic in Topic::all() {
            assert_eq!(topic.as_str().parse::<Topic>().ok(), Some(topic));
        }
    }

    #[test]
    fn test_unknown_topic() {
        let result = "window-functions".parse::<Topic>();
        assert!(matches!(result, Err(TemplateError::UnknownTopic(_))));
    }

    #[test]
    fn test_serde_matches_as_str() {
        for topic in Topic::all() {
            let json = serde_json::to_string(&topic).expect("serialization should succeed");
            assert_eq!(json, format!("\"{}\"", topic.as_str()));
        }
    }

    #[test]
    fn test_keywords_not_empty() {
        for topic in Topic::all() {
            assert!(!topic.keywords().is_empty(), "{topic} has no keywords");
            assert!(!topic.display_name().is_empty());
        }
    }
}
