//! Store -> builder -> layout pipeline.
//!
//! Every call rebuilds from a fresh store read; nothing is cached between
//! calls, so a structural edit is visible on the next request.

use crate::graph::{build_full_graph, build_topic_graph, layout, Layout, LayoutOptions};
use crate::model::graph::{Graph, TopicGraph};
use crate::model::topic::TopicId;
use crate::repo::Store;
use crate::service::error::ServiceResult;
use log::info;
use std::time::Instant;

pub struct GraphService<S: Store> {
    store: S,
    options: LayoutOptions,
}

impl<S: Store> GraphService<S> {
    pub fn new(store: S, options: LayoutOptions) -> Self {
        Self { store, options }
    }

    /// Whole graph across all topics, one node per (note, topic) pair.
    pub fn full_graph(&self) -> ServiceResult<Graph> {
        let started_at = Instant::now();
        let topics = self.store.list_topics()?;
        let notes = self.store.find_all_notes()?;
        let graph = build_full_graph(&notes, &topics);
        info!(
            "event=graph_build module=graph status=ok mode=full nodes={} edges={} duration_ms={}",
            graph.nodes.len(),
            graph.edges.len(),
            started_at.elapsed().as_millis()
        );
        Ok(graph)
    }

    /// View of one topic with borrowed external prerequisites.
    pub fn topic_graph(&self, topic_id: TopicId) -> ServiceResult<TopicGraph> {
        let started_at = Instant::now();
        let topic = self.store.get_topic(topic_id)?;
        let notes = match topic {
            Some(_) => self.store.find_notes_by_topic(topic_id)?,
            None => Vec::new(),
        };
        let view = build_topic_graph(topic_id, &notes, topic.as_ref())?;
        info!(
            "event=graph_build module=graph status=ok mode=topic topic={} nodes={} edges={} duration_ms={}",
            topic_id,
            view.graph.nodes.len(),
            view.graph.edges.len(),
            started_at.elapsed().as_millis()
        );
        Ok(view)
    }

    pub fn full_layout(&self) -> ServiceResult<Layout> {
        let graph = self.full_graph()?;
        Ok(self.positioned(&graph))
    }

    pub fn topic_layout(&self, topic_id: TopicId) -> ServiceResult<Layout> {
        let view = self.topic_graph(topic_id)?;
        Ok(self.positioned(&view.graph))
    }

    fn positioned(&self, graph: &Graph) -> Layout {
        let result = layout(graph, &self.options);
        info!(
            "event=graph_layout module=graph status=ok nodes={} links={}",
            result.nodes.len(),
            result.links.len()
        );
        result
    }
}
