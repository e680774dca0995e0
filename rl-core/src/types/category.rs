//! Record Category

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Material category of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Plastic,
    Paper,
    Glass,
    Metal,
    Organic,
    Hazardous,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 6] = [
        Category::Plastic,
        Category::Paper,
        Category::Glass,
        Category::Metal,
        Category::Organic,
        Category::Hazardous,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plastic => "Plastic",
            Category::Paper => "Paper",
            Category::Glass => "Glass",
            Category::Metal => "Metal",
            Category::Organic => "Organic",
            Category::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown category: {}", wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!("plastic".parse::<Category>().unwrap(), Category::Plastic);
        assert_eq!("Hazardous".parse::<Category>().unwrap(), Category::Hazardous);
        assert!("Wood".parse::<Category>().is_err());
    }

    #[test]
    fn test_wire_name_matches_display() {
        for c in Category::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c));
        }
    }
}
