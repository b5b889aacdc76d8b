use std::time::Instant;

use tracing::debug;

use super::state::SearchState;
use super::{RouteAlgorithm, Router, RouterConfig};
use crate::error::{Error, Result};
use crate::graph::{Distance, Graph, VertexId, INFINITE_DISTANCE};
use crate::heuristic::{GreatCircle, Heuristic, LandmarkBound, Symmetrized, Zero};
use crate::landmarks::{LandmarkSelector, LandmarkTable};
use crate::result::{bidirectional_path, unidirectional_path, RoutingResult};

/// Heuristic strategy injected into the search loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guidance {
    None,
    GreatCircle,
    Landmarks,
}

/// How the two directions of a bidirectional search derive their potentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Potentials {
    /// Each side uses its own estimate toward its own goal.
    Naive,
    /// Each side uses half the difference of the two estimates.
    Symmetrized,
}

/// When a bidirectional search may stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    /// Stop once a popped vertex is already settled by the other side.
    MeetingVertex,
    /// Stop once a popped key reaches the best meeting distance.
    KeyBound,
}

#[derive(Debug, Clone, Copy)]
struct SearchPlan {
    bidirectional: bool,
    guidance: Guidance,
    potentials: Potentials,
}

impl SearchPlan {
    fn for_algorithm(algorithm: RouteAlgorithm) -> Self {
        let (bidirectional, guidance, potentials) = match algorithm {
            RouteAlgorithm::Dijkstra => (false, Guidance::None, Potentials::Naive),
            RouteAlgorithm::AStar => (false, Guidance::GreatCircle, Potentials::Naive),
            RouteAlgorithm::BidirectionalDijkstra => (true, Guidance::None, Potentials::Naive),
            RouteAlgorithm::BidirectionalAStar => (true, Guidance::GreatCircle, Potentials::Naive),
            RouteAlgorithm::ConsistentBidirectionalAStar => {
                (true, Guidance::GreatCircle, Potentials::Symmetrized)
            }
            RouteAlgorithm::Alt => (true, Guidance::Landmarks, Potentials::Naive),
        };
        Self {
            bidirectional,
            guidance,
            potentials,
        }
    }

    fn termination(self) -> Termination {
        match self.guidance {
            Guidance::None => Termination::MeetingVertex,
            Guidance::GreatCircle | Guidance::Landmarks => Termination::KeyBound,
        }
    }
}

/// Which frontier a bidirectional step is expanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Forward,
    Backward,
}

/// Best path found so far through a forward/backward vertex pair.
#[derive(Debug, Clone, Copy)]
struct Meeting {
    distance: Distance,
    forward: VertexId,
    backward: VertexId,
}

impl Meeting {
    fn none() -> Self {
        Self {
            distance: INFINITE_DISTANCE,
            forward: 0,
            backward: 0,
        }
    }

    fn is_found(&self) -> bool {
        self.distance != INFINITE_DISTANCE
    }

    /// Record the path `... -> this_end -> other_end -> ...` if it is shorter.
    fn offer(&mut self, side: Side, this_end: VertexId, other_end: VertexId, distance: Distance) {
        if distance >= self.distance {
            return;
        }
        let (forward, backward) = match side {
            Side::Forward => (this_end, other_end),
            Side::Backward => (other_end, this_end),
        };
        *self = Self {
            distance,
            forward,
            backward,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// Shortest-path engine parameterised by directionality and heuristic strategy.
///
/// The engine owns its per-direction arrays (sized to the graph) and resets
/// them at the start of every query, so one instance serves any number of
/// sequential queries without reallocating.
#[derive(Debug)]
pub struct SearchEngine<'g> {
    graph: &'g Graph,
    landmarks: Option<&'g LandmarkTable>,
    algorithm: RouteAlgorithm,
    plan: SearchPlan,
    forward: SearchState,
    backward: SearchState,
    selector: LandmarkSelector,
    heap_pops: usize,
}

impl<'g> SearchEngine<'g> {
    pub fn new(
        graph: &'g Graph,
        algorithm: RouteAlgorithm,
        landmarks: Option<&'g LandmarkTable>,
        config: RouterConfig,
    ) -> Result<Self> {
        if algorithm.requires_landmarks() && landmarks.is_none() {
            return Err(Error::LandmarksRequired { algorithm });
        }
        if let Some(table) = landmarks {
            if table.vertex_count() != graph.vertex_count() {
                return Err(Error::LandmarkGraphMismatch {
                    landmark_vertices: table.vertex_count(),
                    graph_vertices: graph.vertex_count(),
                });
            }
        }

        let plan = SearchPlan::for_algorithm(algorithm);
        let backward_size = if plan.bidirectional {
            graph.vertex_count()
        } else {
            0
        };

        Ok(Self {
            graph,
            landmarks,
            algorithm,
            plan,
            forward: SearchState::new(graph.vertex_count()),
            backward: SearchState::new(backward_size),
            selector: LandmarkSelector::new(config.active_landmarks),
            heap_pops: 0,
        })
    }

    /// Plain Dijkstra engine, as used for landmark preprocessing.
    pub fn dijkstra(graph: &'g Graph) -> Self {
        Self {
            graph,
            landmarks: None,
            algorithm: RouteAlgorithm::Dijkstra,
            plan: SearchPlan::for_algorithm(RouteAlgorithm::Dijkstra),
            forward: SearchState::new(graph.vertex_count()),
            backward: SearchState::new(0),
            selector: LandmarkSelector::new(0),
            heap_pops: 0,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Landmark ids activated for the most recent ALT query.
    pub fn active_landmarks(&self) -> &[usize] {
        self.selector.active()
    }

    fn search(&mut self, start: VertexId, target: VertexId) -> RoutingResult {
        let started = Instant::now();
        self.heap_pops = 0;
        let graph = self.graph;

        let found = if start == target {
            Some((0, vec![start]))
        } else if !self.plan.bidirectional {
            match self.plan.guidance {
                Guidance::GreatCircle => {
                    self.unidirectional(start, target, &GreatCircle::new(graph, target))
                }
                Guidance::None | Guidance::Landmarks => self.unidirectional(start, target, &Zero),
            }
        } else {
            let termination = self.plan.termination();
            match (self.plan.guidance, self.plan.potentials) {
                (Guidance::None, _) => {
                    self.bidirectional(start, target, &Zero, &Zero, termination)
                }
                (Guidance::GreatCircle, Potentials::Naive) => self.bidirectional(
                    start,
                    target,
                    &GreatCircle::new(graph, target),
                    &GreatCircle::new(graph, start),
                    termination,
                ),
                (Guidance::GreatCircle, Potentials::Symmetrized) => {
                    let to_target = GreatCircle::new(graph, target);
                    let to_start = GreatCircle::new(graph, start);
                    self.bidirectional(
                        start,
                        target,
                        &Symmetrized::new(to_target, to_start),
                        &Symmetrized::new(to_start, to_target),
                        termination,
                    )
                }
                (Guidance::Landmarks, _) => self.landmark_search(start, target, termination),
            }
        };

        let elapsed = started.elapsed();
        let result = match found {
            Some((distance, path)) => {
                RoutingResult::found(self.algorithm, path, distance, elapsed, self.heap_pops)
            }
            None => RoutingResult::not_found(self.algorithm, elapsed, self.heap_pops),
        };

        debug!(
            algorithm = %self.algorithm,
            start,
            target,
            found = result.found,
            distance = result.distance,
            heap_pops = result.heap_pops,
            "route computed"
        );
        result
    }

    fn landmark_search(
        &mut self,
        start: VertexId,
        target: VertexId,
        termination: Termination,
    ) -> Option<(Distance, Vec<VertexId>)> {
        let table = self.landmarks?;
        let active = self.selector.select(table, start, target);
        let to_target = LandmarkBound::new(table, active, target);
        let to_start = LandmarkBound::new(table, active, start);
        self.bidirectional(start, target, &to_target, &to_start, termination)
    }

    fn unidirectional<H: Heuristic>(
        &mut self,
        start: VertexId,
        target: VertexId,
        heuristic: &H,
    ) -> Option<(Distance, Vec<VertexId>)> {
        let graph = self.graph;
        let state = &mut self.forward;
        state.seed(start, heuristic);

        while let Some(vertex) = state.settle_next() {
            self.heap_pops += 1;
            if vertex == target {
                let distance = state.distance[vertex as usize];
                return Some((distance, unidirectional_path(&state.predecessor, target)));
            }

            let reached = state.distance[vertex as usize];
            for edge in graph.edges_of(vertex) {
                let next = graph.dest(edge);
                if state.is_settled(next) {
                    continue;
                }
                state.relax(
                    next,
                    reached.saturating_add(graph.weight(edge)),
                    vertex,
                    heuristic,
                );
            }
        }
        None
    }

    fn bidirectional<F: Heuristic, B: Heuristic>(
        &mut self,
        start: VertexId,
        target: VertexId,
        forward_heuristic: &F,
        backward_heuristic: &B,
        termination: Termination,
    ) -> Option<(Distance, Vec<VertexId>)> {
        let graph = self.graph;
        self.forward.seed(start, forward_heuristic);
        self.backward.seed(target, backward_heuristic);

        let mut best = Meeting::none();
        let mut side = Side::Forward;
        while self.forward.has_frontier() && self.backward.has_frontier() {
            let step = match side {
                Side::Forward => expand(
                    graph,
                    Side::Forward,
                    &mut self.forward,
                    &self.backward,
                    forward_heuristic,
                    target,
                    termination,
                    &mut best,
                ),
                Side::Backward => expand(
                    graph,
                    Side::Backward,
                    &mut self.backward,
                    &self.forward,
                    backward_heuristic,
                    start,
                    termination,
                    &mut best,
                ),
            };
            self.heap_pops += 1;
            if step == Step::Stop {
                break;
            }
            side = match side {
                Side::Forward => Side::Backward,
                Side::Backward => Side::Forward,
            };
        }

        best.is_found().then(|| {
            let path = bidirectional_path(
                &self.forward.predecessor,
                &self.backward.predecessor,
                best.forward,
                best.backward,
            );
            (best.distance, path)
        })
    }
}

/// Pop one vertex from `this` side and relax its edges.
///
/// `goal` is the terminal `this` side is heading for, i.e. the other side's source.
#[allow(clippy::too_many_arguments)]
fn expand<H: Heuristic>(
    graph: &Graph,
    side: Side,
    this: &mut SearchState,
    other: &SearchState,
    heuristic: &H,
    goal: VertexId,
    termination: Termination,
    best: &mut Meeting,
) -> Step {
    let Some(vertex) = this.settle_next() else {
        return Step::Stop;
    };
    let index = vertex as usize;
    let reached = this.distance[index];

    if termination == Termination::KeyBound
        && best.is_found()
        && this.key[index] >= best.distance as f64
    {
        return Step::Stop;
    }

    if other.is_settled(vertex) {
        best.offer(
            side,
            vertex,
            vertex,
            reached.saturating_add(other.distance[index]),
        );
        if vertex == goal || termination == Termination::MeetingVertex {
            return Step::Stop;
        }
    }

    for edge in graph.edges_of(vertex) {
        let next = graph.dest(edge);
        if this.is_settled(next) {
            continue;
        }
        let through = reached.saturating_add(graph.weight(edge));
        if other.is_settled(next) {
            best.offer(
                side,
                vertex,
                next,
                through.saturating_add(other.distance[next as usize]),
            );
            if termination == Termination::KeyBound {
                continue;
            }
        }
        this.relax(next, through, vertex, heuristic);
    }
    Step::Continue
}

impl Router for SearchEngine<'_> {
    fn algorithm(&self) -> RouteAlgorithm {
        self.algorithm
    }

    fn route(&mut self, start: VertexId, target: VertexId) -> Result<RoutingResult> {
        self.graph.check_vertex(start)?;
        self.graph.check_vertex(target)?;
        Ok(self.search(start, target))
    }

    fn route_to_all_vertices(&mut self, anchor: VertexId) -> Result<Vec<Distance>> {
        self.graph.check_vertex(anchor)?;
        let graph = self.graph;
        let state = &mut self.forward;
        state.seed(anchor, &Zero);

        while let Some(vertex) = state.settle_next() {
            let reached = state.distance[vertex as usize];
            for edge in graph.edges_of(vertex) {
                let next = graph.dest(edge);
                if !state.is_settled(next) {
                    state.relax(next, reached.saturating_add(graph.weight(edge)), vertex, &Zero);
                }
            }
        }
        Ok(state.distance.clone())
    }
}
