use std::collections::HashMap;

use crate::models::{Category, FeedbackRecord, Rating};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryAverage {
    pub category: Category,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeacherAggregate {
    pub teacher_name: String,
    pub initials: String,
    pub records: Vec<FeedbackRecord>,
    pub average_satisfaction: f64,
    pub category_averages: Vec<CategoryAverage>,
}

impl TeacherAggregate {
    pub fn review_count(&self) -> usize {
        self.records.len()
    }

    pub fn category_average(&self, category: Category) -> Option<f64> {
        self.category_averages
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.average)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSummary {
    pub subject: String,
    pub count: usize,
    pub average_satisfaction: f64,
}

/// Groups records by exact teacher name. Groups come out in the order each
/// name first appears in `records`.
pub fn aggregate(records: &[FeedbackRecord]) -> Vec<TeacherAggregate> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&FeedbackRecord>)> = Vec::new();

    for record in records {
        let name = record.teacher_name.as_str();
        let slot = *slots.entry(name).or_insert_with(|| {
            groups.push((name, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }

    groups
        .into_iter()
        .map(|(name, members)| summarize_teacher(name, members))
        .collect()
}

fn summarize_teacher(name: &str, mut members: Vec<&FeedbackRecord>) -> TeacherAggregate {
    // sort_by is stable, so equal timestamps keep their input order
    members.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let category_averages = Category::ALL
        .iter()
        .map(|&category| CategoryAverage {
            category,
            average: mean(&members, |record| record.rating(category)),
        })
        .collect();

    TeacherAggregate {
        teacher_name: name.to_string(),
        initials: render::initials(name),
        average_satisfaction: mean(&members, |record| record.satisfaction),
        category_averages,
        records: members.into_iter().cloned().collect(),
    }
}

fn mean(records: &[&FeedbackRecord], pick: impl Fn(&FeedbackRecord) -> Rating) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: f64 = records
        .iter()
        .map(|record| f64::from(pick(record).value()))
        .sum();
    total / records.len() as f64
}

pub fn summarize_by_subject(records: &[FeedbackRecord]) -> Vec<SubjectSummary> {
    let mut map: HashMap<&str, (usize, u32)> = HashMap::new();

    for record in records {
        let entry = map.entry(record.subject.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u32::from(record.satisfaction.value());
    }

    let mut summaries: Vec<SubjectSummary> = map
        .into_iter()
        .map(|(subject, (count, total))| SubjectSummary {
            subject: subject.to_string(),
            count,
            average_satisfaction: f64::from(total) / count as f64,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.subject.cmp(&b.subject)));
    summaries
}
