use serde::Serialize;

use crate::aggregate::TeacherAggregate;
use crate::models::{Category, FeedbackRecord, Rating};

pub const FULL_STAR: char = '★';
pub const HALF_STAR: char = '½';
pub const EMPTY_STAR: char = '☆';
const STAR_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
    Neutral,
}

impl Sentiment {
    pub fn from_score(score: i64) -> Self {
        match score {
            1 => Sentiment::Poor,
            2 => Sentiment::Fair,
            3 => Sentiment::Good,
            4 => Sentiment::VeryGood,
            5 => Sentiment::Excellent,
            _ => Sentiment::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Poor => "Poor",
            Sentiment::Fair => "Fair",
            Sentiment::Good | Sentiment::Neutral => "Good",
            Sentiment::VeryGood => "Very Good",
            Sentiment::Excellent => "Excellent",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Sentiment::Poor => "😞",
            Sentiment::Fair => "😐",
            Sentiment::Good | Sentiment::Neutral => "😊",
            Sentiment::VeryGood => "😄",
            Sentiment::Excellent => "🤩",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Sentiment::Poor => "#ff4757",
            Sentiment::Fair => "#ffa502",
            Sentiment::Good => "#2ed573",
            Sentiment::VeryGood => "#1e90ff",
            Sentiment::Excellent => "#5352ed",
            Sentiment::Neutral => "#747d8c",
        }
    }
}

impl From<Rating> for Sentiment {
    fn from(rating: Rating) -> Self {
        Self::from_score(i64::from(rating.value()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderTree {
    Empty(EmptyState),
    Teachers { sections: Vec<TeacherSection> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: &'static str,
    pub message: &'static str,
    pub call_to_action: &'static str,
}

impl Default for EmptyState {
    fn default() -> Self {
        Self {
            title: "No Feedback Yet",
            message: "Be the first to share your feedback!",
            call_to_action: "Use the form to submit your review",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherSection {
    pub teacher_name: String,
    pub initials: String,
    pub review_count: usize,
    pub review_count_label: String,
    pub stars: String,
    pub average: f64,
    pub average_label: String,
    pub performance: Vec<PerformanceBar>,
    pub feedback: Vec<FeedbackCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceBar {
    pub label: &'static str,
    pub average: f64,
    pub width_percent: f64,
    pub value_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackCard {
    pub position: usize,
    pub animation_delay_secs: f64,
    pub subject: String,
    pub overall: RatingBadge,
    pub pills: Vec<RatingPill>,
    pub comments: String,
    pub posted_at: String,
    pub short_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingBadge {
    pub rating: u8,
    pub emoji: &'static str,
    pub color: &'static str,
    pub sentiment: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingPill {
    pub label: &'static str,
    pub rating: u8,
    pub rating_label: String,
    pub emoji: &'static str,
    pub color: &'static str,
}

pub fn render(aggregates: &[TeacherAggregate]) -> RenderTree {
    if aggregates.is_empty() {
        return RenderTree::Empty(EmptyState::default());
    }
    RenderTree::Teachers {
        sections: aggregates.iter().map(teacher_section).collect(),
    }
}

fn teacher_section(aggregate: &TeacherAggregate) -> TeacherSection {
    let count = aggregate.review_count();
    TeacherSection {
        teacher_name: aggregate.teacher_name.clone(),
        initials: aggregate.initials.clone(),
        review_count: count,
        review_count_label: review_count_label(count),
        stars: star_string(aggregate.average_satisfaction),
        average: aggregate.average_satisfaction,
        average_label: format!("{:.1}/5", aggregate.average_satisfaction),
        performance: aggregate
            .category_averages
            .iter()
            .map(|entry| PerformanceBar {
                label: entry.category.label(),
                average: entry.average,
                width_percent: bar_width(entry.average),
                value_label: format!("{:.1}", entry.average),
            })
            .collect(),
        feedback: aggregate
            .records
            .iter()
            .enumerate()
            .map(|(position, record)| feedback_card(position, record))
            .collect(),
    }
}

fn feedback_card(position: usize, record: &FeedbackRecord) -> FeedbackCard {
    let overall = Sentiment::from(record.satisfaction);
    FeedbackCard {
        position,
        animation_delay_secs: position as f64 * 0.1,
        subject: record.subject.clone(),
        overall: RatingBadge {
            rating: record.satisfaction.value(),
            emoji: overall.emoji(),
            color: overall.color(),
            sentiment: overall.label(),
        },
        pills: Category::ALL
            .iter()
            .map(|&category| rating_pill(category, record.rating(category)))
            .collect(),
        comments: record.comments.clone(),
        posted_at: format!("{} at {}", record.date, record.time),
        short_id: short_id(record.id),
    }
}

fn rating_pill(category: Category, rating: Rating) -> RatingPill {
    let sentiment = Sentiment::from(rating);
    RatingPill {
        label: category.label(),
        rating: rating.value(),
        rating_label: format!("{rating}/5"),
        emoji: sentiment.emoji(),
        color: sentiment.color(),
    }
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Five glyphs: whole stars, a half star when the remainder is at least
/// one half, then empty stars.
pub fn star_string(average: f64) -> String {
    let clamped = if average.is_finite() {
        average.clamp(0.0, STAR_SLOTS as f64)
    } else {
        0.0
    };
    let full = clamped.floor() as usize;
    let half = usize::from(full < STAR_SLOTS && clamped.fract() >= 0.5);
    let empty = STAR_SLOTS - full - half;

    let mut stars = String::with_capacity(STAR_SLOTS * 3);
    stars.extend(std::iter::repeat(FULL_STAR).take(full));
    stars.extend(std::iter::repeat(HALF_STAR).take(half));
    stars.extend(std::iter::repeat(EMPTY_STAR).take(empty));
    stars
}

pub fn bar_width(average: f64) -> f64 {
    (average / 5.0) * 100.0
}

pub fn review_count_label(count: usize) -> String {
    if count > 1 {
        format!("{count} reviews")
    } else {
        format!("{count} review")
    }
}

pub fn short_id(id: i64) -> String {
    let digits = id.to_string();
    let start = digits.len().saturating_sub(6);
    format!("#{}", &digits[start..])
}
