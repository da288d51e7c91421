//! Graph builder for the whole-graph and single-topic views.
//!
//! # Invariants
//! - Whole graph: a note in N topics yields N composite nodes; each composite
//!   node has one edge per same-topic prerequisite, or exactly one fallback
//!   edge from its topic.
//! - Topic view: every node is reachable from the topic node.
//! - No duplicate edge (same source and target) within one derivation.

use crate::graph::GraphError;
use crate::model::graph::{Graph, GraphEdge, GraphNode, NodeKey, TopicGraph};
use crate::model::note::{Note, NoteId, Prerequisite};
use crate::model::topic::{Topic, TopicId};
use std::collections::{HashMap, HashSet};

/// Insertion-ordered node/edge accumulator with duplicate suppression.
#[derive(Default)]
struct GraphAccumulator {
    graph: Graph,
    node_keys: HashSet<NodeKey>,
    edge_keys: HashSet<(NodeKey, NodeKey)>,
}

impl GraphAccumulator {
    fn add_node(&mut self, key: NodeKey, name: &str) -> bool {
        if !self.node_keys.insert(key) {
            return false;
        }
        self.graph.nodes.push(GraphNode::new(key, name));
        true
    }

    fn contains_node(&self, key: &NodeKey) -> bool {
        self.node_keys.contains(key)
    }

    fn add_edge(&mut self, source: NodeKey, target: NodeKey) {
        if self.edge_keys.insert((source, target)) {
            self.graph.edges.push(GraphEdge::new(source, target));
        }
    }

    fn has_inbound(&self, key: &NodeKey) -> bool {
        self.edge_keys.iter().any(|(_, target)| target == key)
    }

    fn finish(self) -> Graph {
        self.graph
    }
}

/// Builds the whole graph: every topic plus one node per (note, topic) pair.
///
/// Prerequisite topic memberships come from the resolved stub when present,
/// otherwise from the note list itself. A prerequisite that is not part of
/// `notes` produces no edge, so no edge ever points at a missing node.
pub fn build_full_graph(notes: &[Note], topics: &[Topic]) -> Graph {
    let mut acc = GraphAccumulator::default();
    let members: HashMap<NoteId, &Note> = notes.iter().map(|note| (note.id, note)).collect();

    for topic in topics {
        acc.add_node(NodeKey::Topic(topic.id), &topic.name);
    }

    for note in notes {
        for &topic in &note.topics {
            acc.add_node(
                NodeKey::Composite {
                    note: note.id,
                    topic,
                },
                &note.title,
            );
        }
    }

    for note in notes {
        for &topic in &note.topics {
            let target = NodeKey::Composite {
                note: note.id,
                topic,
            };
            let same_topic: Vec<NoteId> = note
                .prerequisites
                .iter()
                .filter(|prerequisite| shares_topic(prerequisite, &members, topic))
                .map(Prerequisite::id)
                .collect();

            if same_topic.is_empty() {
                acc.add_edge(NodeKey::Topic(topic), target);
                continue;
            }
            for prerequisite in same_topic {
                acc.add_edge(
                    NodeKey::Composite {
                        note: prerequisite,
                        topic,
                    },
                    target,
                );
            }
        }
    }

    acc.finish()
}

/// Builds the view of one topic.
///
/// `notes` are the topic's members. Prerequisites living outside the topic
/// are pulled in as external nodes and hung off the topic node when nothing
/// else points at them.
///
/// # Errors
/// - `GraphError::TopicNotFound` when `topic` is absent or has another id.
pub fn build_topic_graph(
    topic_id: TopicId,
    notes: &[Note],
    topic: Option<&Topic>,
) -> Result<TopicGraph, GraphError> {
    let topic = topic
        .filter(|topic| topic.id == topic_id)
        .ok_or(GraphError::TopicNotFound(topic_id))?;
    let root = NodeKey::Topic(topic.id);

    let mut acc = GraphAccumulator::default();
    acc.add_node(root, &topic.name);
    for note in notes {
        acc.add_node(NodeKey::Note(note.id), &note.title);
    }

    let mut external = Vec::new();
    for note in notes {
        let target = NodeKey::Note(note.id);
        if note.prerequisites.is_empty() {
            acc.add_edge(root, target);
            continue;
        }
        for prerequisite in &note.prerequisites {
            let source = NodeKey::Note(prerequisite.id());
            if !acc.contains_node(&source) {
                let name = prerequisite
                    .title()
                    .map(str::to_string)
                    .unwrap_or_else(|| prerequisite.id().to_string());
                acc.add_node(source, &name);
                external.push(source);
            }
            acc.add_edge(source, target);
        }
    }

    for key in external {
        if !acc.has_inbound(&key) {
            acc.add_edge(root, key);
        }
    }

    Ok(TopicGraph {
        graph: acc.finish(),
        topic: topic.clone(),
    })
}

fn shares_topic(
    prerequisite: &Prerequisite,
    members: &HashMap<NoteId, &Note>,
    topic: TopicId,
) -> bool {
    let Some(member) = members.get(&prerequisite.id()) else {
        return false;
    };
    match prerequisite.topics() {
        Some(topics) => topics.contains(&topic),
        None => member.belongs_to(topic),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_full_graph, build_topic_graph};
    use crate::graph::GraphError;
    use crate::model::graph::NodeKey;
    use crate::model::note::{Note, Prerequisite, PrerequisiteStub};
    use crate::model::topic::Topic;
    use uuid::Uuid;

    fn note(title: &str, topics: &[&Topic]) -> Note {
        let mut note = Note::new("alice", title);
        note.topics = topics.iter().map(|topic| topic.id).collect();
        note
    }

    fn resolved(prerequisite: &Note) -> Prerequisite {
        Prerequisite::Resolved(PrerequisiteStub {
            id: prerequisite.id,
            title: prerequisite.title.clone(),
            topics: prerequisite.topics.clone(),
        })
    }

    #[test]
    fn topic_graph_matches_algebra_scenario() {
        let algebra = Topic::new("alice", "Algebra");
        let linear = note("Linear Eq", &[&algebra]);
        let mut quadratics = note("Quadratics", &[&algebra]);
        quadratics.prerequisites.push(resolved(&linear));

        let view = build_topic_graph(algebra.id, &[linear.clone(), quadratics.clone()], Some(&algebra))
            .unwrap();

        let node_ids: Vec<NodeKey> = view.graph.nodes.iter().map(|node| node.id).collect();
        assert_eq!(
            node_ids,
            vec![
                NodeKey::Topic(algebra.id),
                NodeKey::Note(linear.id),
                NodeKey::Note(quadratics.id)
            ]
        );
        assert_eq!(view.graph.edges.len(), 2);
        assert!(view
            .graph
            .has_edge(NodeKey::Topic(algebra.id), NodeKey::Note(linear.id)));
        assert!(view
            .graph
            .has_edge(NodeKey::Note(linear.id), NodeKey::Note(quadratics.id)));
    }

    #[test]
    fn topic_graph_hangs_external_prerequisites_off_the_topic() {
        let algebra = Topic::new("alice", "Algebra");
        let arithmetic = Topic::new("alice", "Arithmetic");
        let fractions = note("Fractions", &[&arithmetic]);
        let mut ratios = note("Ratios", &[&algebra]);
        ratios.prerequisites.push(resolved(&fractions));

        let view = build_topic_graph(algebra.id, &[ratios.clone()], Some(&algebra)).unwrap();

        let external = NodeKey::Note(fractions.id);
        assert_eq!(view.graph.node(&external).unwrap().name, "Fractions");
        assert!(view.graph.has_edge(external, NodeKey::Note(ratios.id)));
        assert!(view.graph.has_edge(NodeKey::Topic(algebra.id), external));
        assert_eq!(view.graph.inbound_count(&external), 1);
        assert!(!view
            .graph
            .has_edge(NodeKey::Topic(algebra.id), NodeKey::Note(ratios.id)));
    }

    #[test]
    fn topic_graph_shares_one_external_node_between_dependents() {
        let algebra = Topic::new("alice", "Algebra");
        let sets = note("Sets", &[]);
        let mut a = note("A", &[&algebra]);
        let mut b = note("B", &[&algebra]);
        a.prerequisites.push(resolved(&sets));
        b.prerequisites.push(resolved(&sets));

        let view = build_topic_graph(algebra.id, &[a, b], Some(&algebra)).unwrap();

        assert_eq!(view.graph.nodes.len(), 4);
        let external = NodeKey::Note(sets.id);
        assert_eq!(view.graph.inbound_count(&external), 1);
        assert_eq!(view.graph.edges.len(), 3);
    }

    #[test]
    fn topic_graph_uses_id_as_name_for_unresolved_reference() {
        let algebra = Topic::new("alice", "Algebra");
        let missing = Uuid::new_v4();
        let mut a = note("A", &[&algebra]);
        a.prerequisites.push(Prerequisite::Reference(missing));

        let view = build_topic_graph(algebra.id, &[a], Some(&algebra)).unwrap();
        assert_eq!(
            view.graph.node(&NodeKey::Note(missing)).unwrap().name,
            missing.to_string()
        );
    }

    #[test]
    fn topic_graph_reports_missing_topic() {
        let algebra = Topic::new("alice", "Algebra");
        let other = Uuid::new_v4();
        assert_eq!(
            build_topic_graph(other, &[], None).unwrap_err(),
            GraphError::TopicNotFound(other)
        );
        assert_eq!(
            build_topic_graph(other, &[], Some(&algebra)).unwrap_err(),
            GraphError::TopicNotFound(other)
        );
    }

    #[test]
    fn full_graph_duplicates_note_per_topic() {
        let x = Topic::new("alice", "X");
        let y = Topic::new("alice", "Y");
        let m = note("M", &[&x, &y]);

        let graph = build_full_graph(&[m.clone()], &[x.clone(), y.clone()]);

        let composites: Vec<NodeKey> = graph
            .nodes
            .iter()
            .map(|node| node.id)
            .filter(|id| matches!(id, NodeKey::Composite { .. }))
            .collect();
        assert_eq!(
            composites,
            vec![
                NodeKey::Composite { note: m.id, topic: x.id },
                NodeKey::Composite { note: m.id, topic: y.id },
            ]
        );
        assert!(graph.has_edge(NodeKey::Topic(x.id), composites[0]));
        assert!(graph.has_edge(NodeKey::Topic(y.id), composites[1]));
    }

    #[test]
    fn full_graph_uses_same_topic_prerequisites_only() {
        let x = Topic::new("alice", "X");
        let y = Topic::new("alice", "Y");
        let base = note("Base", &[&x]);
        let mut m = note("M", &[&x, &y]);
        m.prerequisites.push(resolved(&base));

        let graph = build_full_graph(&[base.clone(), m.clone()], &[x.clone(), y.clone()]);

        let m_in_x = NodeKey::Composite { note: m.id, topic: x.id };
        let m_in_y = NodeKey::Composite { note: m.id, topic: y.id };
        let base_in_x = NodeKey::Composite { note: base.id, topic: x.id };
        assert!(graph.has_edge(base_in_x, m_in_x));
        assert!(!graph.has_edge(NodeKey::Topic(x.id), m_in_x));
        assert!(graph.has_edge(NodeKey::Topic(y.id), m_in_y));
        assert_eq!(graph.inbound_count(&m_in_y), 1);
    }

    #[test]
    fn full_graph_falls_back_to_note_list_for_reference_topics() {
        let x = Topic::new("alice", "X");
        let base = note("Base", &[&x]);
        let mut m = note("M", &[&x]);
        m.prerequisites.push(Prerequisite::Reference(base.id));

        let graph = build_full_graph(&[base.clone(), m.clone()], &[x.clone()]);
        assert!(graph.has_edge(
            NodeKey::Composite { note: base.id, topic: x.id },
            NodeKey::Composite { note: m.id, topic: x.id }
        ));
    }

    #[test]
    fn full_graph_reference_in_other_topic_falls_back_to_topic_edge() {
        let x = Topic::new("alice", "X");
        let y = Topic::new("alice", "Y");
        let other = note("Other", &[&y]);
        let mut m = note("M", &[&x]);
        m.prerequisites.push(Prerequisite::Reference(other.id));

        let graph = build_full_graph(&[other.clone(), m.clone()], &[x.clone(), y.clone()]);
        let m_in_x = NodeKey::Composite { note: m.id, topic: x.id };
        assert!(graph.has_edge(NodeKey::Topic(x.id), m_in_x));
        assert_eq!(graph.inbound_count(&m_in_x), 1);
    }

    #[test]
    fn full_graph_ignores_prerequisites_outside_the_note_set() {
        let x = Topic::new("alice", "X");
        let ghost = note("Ghost", &[&x]);
        let mut m = note("M", &[&x]);
        m.prerequisites.push(resolved(&ghost));

        let graph = build_full_graph(&[m.clone()], &[x.clone()]);
        let m_in_x = NodeKey::Composite { note: m.id, topic: x.id };
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.has_edge(NodeKey::Topic(x.id), m_in_x));
    }

    #[test]
    fn every_note_node_has_an_inbound_edge() {
        let x = Topic::new("alice", "X");
        let y = Topic::new("alice", "Y");
        let a = note("A", &[&x]);
        let mut b = note("B", &[&x, &y]);
        b.prerequisites.push(resolved(&a));
        let mut c = note("C", &[&y]);
        c.prerequisites.push(resolved(&b));
        c.prerequisites.push(resolved(&a));

        let graph = build_full_graph(&[a, b, c], &[x, y]);
        for node in &graph.nodes {
            if matches!(node.id, NodeKey::Composite { .. }) {
                assert!(graph.inbound_count(&node.id) >= 1, "{} is orphaned", node.id);
            }
        }
    }
}
