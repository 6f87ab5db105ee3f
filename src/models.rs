use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "RatingRepr")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const LOWEST: Rating = Rating(Self::MIN);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<u8>().ok().and_then(Self::new)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

// Blobs written by the browser widget carry radio values as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RatingRepr {
    Number(i64),
    Text(String),
}

impl TryFrom<RatingRepr> for Rating {
    type Error = String;

    fn try_from(repr: RatingRepr) -> Result<Self, Self::Error> {
        let parsed = match repr {
            RatingRepr::Number(value) => u8::try_from(value).ok().and_then(Rating::new),
            RatingRepr::Text(text) => Rating::parse(&text),
        };
        parsed.ok_or_else(|| {
            format!(
                "rating must be an integer between {} and {}",
                Rating::MIN,
                Rating::MAX
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Effectiveness,
    Communication,
    Knowledge,
    Management,
    Punctuality,
    Support,
    Aids,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Effectiveness,
        Category::Communication,
        Category::Knowledge,
        Category::Management,
        Category::Punctuality,
        Category::Support,
        Category::Aids,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Effectiveness => "Teaching",
            Category::Communication => "Communication",
            Category::Knowledge => "Knowledge",
            Category::Management => "Management",
            Category::Punctuality => "Punctuality",
            Category::Support => "Support",
            Category::Aids => "Teaching Aids",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingField {
    Category(Category),
    Satisfaction,
}

impl RatingField {
    pub const ALL: [RatingField; 8] = [
        RatingField::Category(Category::Effectiveness),
        RatingField::Category(Category::Communication),
        RatingField::Category(Category::Knowledge),
        RatingField::Category(Category::Management),
        RatingField::Category(Category::Punctuality),
        RatingField::Category(Category::Support),
        RatingField::Category(Category::Aids),
        RatingField::Satisfaction,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: i64,
    pub teacher_name: String,
    pub subject: String,
    pub effectiveness: Rating,
    pub communication: Rating,
    pub knowledge: Rating,
    pub management: Rating,
    pub punctuality: Rating,
    pub support: Rating,
    pub aids: Rating,
    pub satisfaction: Rating,
    pub comments: String,
    pub date: String,
    pub time: String,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn rating(&self, category: Category) -> Rating {
        match category {
            Category::Effectiveness => self.effectiveness,
            Category::Communication => self.communication,
            Category::Knowledge => self.knowledge,
            Category::Management => self.management,
            Category::Punctuality => self.punctuality,
            Category::Support => self.support,
            Category::Aids => self.aids,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSubmission {
    pub teacher_name: Option<String>,
    pub subject: Option<String>,
    pub selections: HashMap<RatingField, Vec<String>>,
    pub comments: Option<String>,
}

impl RawSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_teacher_name(mut self, name: impl Into<String>) -> Self {
        self.teacher_name = Some(name.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub fn select(mut self, field: RatingField, value: impl Into<String>) -> Self {
        self.selections.entry(field).or_default().push(value.into());
        self
    }

    pub fn select_all(self, value: &str) -> Self {
        RatingField::ALL
            .into_iter()
            .fold(self, |payload, field| payload.select(field, value))
    }

    pub fn selected(&self, field: RatingField) -> Option<Rating> {
        match self.selections.get(&field).map(Vec::as_slice) {
            Some([only]) => Rating::parse(only),
            _ => None,
        }
    }
}
