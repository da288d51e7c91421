//! Topic use-case service.
//!
//! # Invariants
//! - Topic names are trimmed and inner whitespace runs collapse to one space.
//! - Creating a taken name returns the existing topic instead of failing.

use crate::model::topic::{Topic, TopicId};
use crate::repo::topic_repo::TopicRepository;
use crate::service::error::{Missing, ServiceError, ServiceResult};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

pub struct TopicService<R: TopicRepository> {
    repo: R,
}

impl<R: TopicRepository> TopicService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a topic, or returns the existing one with the same name.
    pub fn create_topic(&self, name: &str) -> ServiceResult<Topic> {
        let normalized = normalize_name(name)
            .ok_or_else(|| ServiceError::InvalidName(name.to_string()))?;
        Ok(self.repo.create_topic(&normalized)?)
    }

    /// Resolves each name to a topic id, creating missing topics.
    pub fn ensure_topics(&self, names: &[String]) -> ServiceResult<Vec<TopicId>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = self.create_topic(name)?.id;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    pub fn get_topic(&self, id: TopicId) -> ServiceResult<Topic> {
        self.repo
            .get_topic(id)?
            .ok_or(ServiceError::NotFound(Missing::Topic(id)))
    }

    pub fn list_topics(&self) -> ServiceResult<Vec<Topic>> {
        Ok(self.repo.list_topics()?)
    }

    /// Deletes a topic; member notes survive and simply lose the membership.
    pub fn delete_topic(&self, id: TopicId) -> ServiceResult<()> {
        Ok(self.repo.delete_topic(id)?)
    }
}

/// Trims and collapses whitespace; `None` when nothing is left.
pub fn normalize_name(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}
