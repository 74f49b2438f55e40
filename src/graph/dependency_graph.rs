use crate::error::{ScheduleError, ScheduleResult};
use crate::schedule::Schedule;
use crate::task::{ScheduleItem, TaskId};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Dependency edges of a schedule, pointing from a dependency to its dependent.
pub struct DependencyGraph {
    graph: DiGraph<TaskId, ()>,
}

impl DependencyGraph {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let mut graph: DiGraph<TaskId, ()> = DiGraph::new();
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::new();

        // Add nodes first
        for item in schedule.items() {
            let node_ix = graph.add_node(item.id().clone());
            id_to_index.insert(item.id().clone(), node_ix);
        }

        // Add edges: dependency -> dependent
        for item in schedule.items() {
            for dep in item.dependencies() {
                if let (Some(&u), Some(&v)) = (id_to_index.get(dep), id_to_index.get(item.id())) {
                    graph.add_edge(u, v, ());
                }
            }
        }

        Self { graph }
    }

    /// Ids ordered so every dependency precedes its dependents.
    pub fn topological_order(&self) -> ScheduleResult<Vec<TaskId>> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().map(|ix| self.graph[ix].clone()).collect()),
            Err(cycle) => {
                let task = self.graph[cycle.node_id()].clone();
                log::error!("dependency cycle through task {task}");
                Err(ScheduleError::DependencyCycle { task })
            }
        }
    }

    pub fn check_acyclic(&self) -> ScheduleResult<()> {
        self.topological_order().map(|_| ())
    }
}
