// Navigation and Fuel Planning Module
// Fuel-constrained shortest paths over the graph of refuel-capable waypoints

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::{Ship, Waypoint};
use crate::v_debug;

/// Complete, undirected graph weighted by Euclidean distance.
#[derive(Debug, Clone, Default)]
pub struct RefuelGraph {
    nodes: HashMap<String, Waypoint>,
    edges: HashMap<String, HashMap<String, f64>>,
}

impl RefuelGraph {
    pub fn complete(waypoints: &[Waypoint]) -> Self {
        let mut graph = Self::default();
        for waypoint in waypoints {
            graph.insert_connected(waypoint);
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.nodes.contains_key(symbol)
    }

    /// Add `waypoint` with an edge to every existing node. No-op if present.
    fn insert_connected(&mut self, waypoint: &Waypoint) {
        if self.contains(&waypoint.symbol) {
            return;
        }

        let links: Vec<(String, f64)> = self
            .nodes
            .values()
            .map(|node| (node.symbol.clone(), node.distance_to(waypoint)))
            .collect();

        for (neighbor, weight) in &links {
            self.edges
                .entry(neighbor.clone())
                .or_default()
                .insert(waypoint.symbol.clone(), *weight);
        }
        self.edges
            .entry(waypoint.symbol.clone())
            .or_default()
            .extend(links);
        self.nodes.insert(waypoint.symbol.clone(), waypoint.clone());
    }

    fn remove_edge(&mut self, a: &str, b: &str) {
        if let Some(neighbors) = self.edges.get_mut(a) {
            neighbors.remove(b);
        }
        if let Some(neighbors) = self.edges.get_mut(b) {
            neighbors.remove(a);
        }
    }

    /// Drop edges touching `symbol` that are longer than `max_weight`.
    fn prune_node_edges(&mut self, symbol: &str, max_weight: f64) {
        let too_long: Vec<String> = self
            .edges
            .get(symbol)
            .map(|neighbors| {
                neighbors
                    .iter()
                    .filter(|(_, weight)| **weight > max_weight)
                    .map(|(neighbor, _)| neighbor.clone())
                    .collect()
            })
            .unwrap_or_default();

        for neighbor in too_long {
            self.remove_edge(symbol, &neighbor);
        }
    }

    fn prune_all_edges(&mut self, max_weight: f64) {
        for neighbors in self.edges.values_mut() {
            neighbors.retain(|_, weight| *weight <= max_weight);
        }
    }

    /// Dijkstra from `from` to `to`. Returns the vertex sequence (both ends
    /// included) and its total weight.
    fn dijkstra(&self, from: &str, to: &str) -> Option<(Vec<String>, f64)> {
        let mut dist: HashMap<&str, f64> = HashMap::new();
        let mut prev: HashMap<&str, &str> = HashMap::new();
        // Min-heap on (cost, symbol); the symbol breaks ties deterministically.
        let mut heap: BinaryHeap<Reverse<(Cost, &str)>> = BinaryHeap::new();

        let (start, _) = self.nodes.get_key_value(from)?;
        dist.insert(start.as_str(), 0.0);
        heap.push(Reverse((Cost(0.0), start.as_str())));

        while let Some(Reverse((Cost(cost), node))) = heap.pop() {
            if node == to {
                return Some((reconstruct(&prev, node), cost));
            }

            // Skip stale heap entries.
            if dist.get(node).is_some_and(|best| cost > *best) {
                continue;
            }

            let Some(neighbors) = self.edges.get(node) else { continue };
            for (neighbor, weight) in neighbors {
                let next_cost = cost + weight;
                let improves = dist.get(neighbor.as_str()).is_none_or(|best| next_cost < *best);
                if improves {
                    dist.insert(neighbor.as_str(), next_cost);
                    prev.insert(neighbor.as_str(), node);
                    heap.push(Reverse((Cost(next_cost), neighbor.as_str())));
                }
            }
        }

        None
    }
}

fn reconstruct(prev: &HashMap<&str, &str>, to: &str) -> Vec<String> {
    let mut path = vec![to.to_string()];
    let mut current = to;
    while let Some(previous) = prev.get(current) {
        path.push(previous.to_string());
        current = previous;
    }
    path.reverse();
    path
}

/// Non-negative path cost with a total order for the heap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A feasible route: the stops after the origin, ending at the destination.
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    pub waypoints: Vec<Waypoint>,
    pub length: f64,
}

impl PlannedRoute {
    pub fn symbols(&self) -> Vec<String> {
        self.waypoints.iter().map(|w| w.symbol.clone()).collect()
    }
}

/// Answers "how do I get there on this much fuel" questions.
///
/// The refuel graph is swapped wholesale on reload; queries work on a
/// private clone, so readers never observe a half-built graph.
#[derive(Default)]
pub struct RouteOracle {
    graph: RwLock<Arc<RefuelGraph>>,
}

impl RouteOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the refuel graph with a complete graph over `waypoints`.
    pub fn load_refuel_waypoints(&self, waypoints: &[Waypoint]) {
        let graph = Arc::new(RefuelGraph::complete(waypoints));
        v_debug!("⛽ Refuel graph rebuilt with {} waypoints", graph.node_count());
        *self.graph.write().unwrap_or_else(PoisonError::into_inner) = graph;
    }

    fn snapshot(&self) -> Arc<RefuelGraph> {
        Arc::clone(&self.graph.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn node_count(&self) -> usize {
        self.snapshot().node_count()
    }

    pub fn is_refuel_point(&self, symbol: &str) -> bool {
        self.snapshot().contains(symbol)
    }

    /// Shortest route from `origin` to `destination` where the first hop is
    /// bounded by `current_fuel` and every hop by `fuel_capacity`.
    ///
    /// `None` means no feasible route exists right now.
    pub fn shortest_route(
        &self,
        origin: &Waypoint,
        destination: &Waypoint,
        current_fuel: i32,
        fuel_capacity: i32,
    ) -> Option<PlannedRoute> {
        let mut graph = (*self.snapshot()).clone();
        graph.insert_connected(origin);
        graph.insert_connected(destination);

        graph.prune_node_edges(&origin.symbol, current_fuel as f64);
        graph.prune_all_edges(fuel_capacity as f64);

        let (path, length) = graph.dijkstra(&origin.symbol, &destination.symbol)?;
        let waypoints = path
            .iter()
            .skip(1)
            .filter_map(|symbol| graph.nodes.get(symbol).cloned())
            .collect();

        Some(PlannedRoute { waypoints, length })
    }

    /// Same as [`Self::shortest_route`], starting where `ship` is headed with
    /// its current fuel load.
    pub fn shortest_route_for_ship(&self, ship: &Ship, destination: &Waypoint) -> Option<PlannedRoute> {
        let origin = Waypoint::from(&ship.nav.route.destination);
        self.shortest_route(&origin, destination, ship.fuel.current, ship.fuel.capacity)
    }
}
