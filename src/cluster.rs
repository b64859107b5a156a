//! Partitioning topics into groups of parallel sessions.
//!
//! Topics that appeal to the same persons should not run in parallel, so the
//! clusterer maximizes the summed pairwise dissimilarity inside each group.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use itertools::Itertools;
use rand::Rng;

use crate::action::TopicSwap;
use crate::anneal::{self, Acceptance, Landscape, Params};
use crate::model::condition::Score;
use crate::model::entity::{GroupId, TopicId};
use crate::preference::PreferenceModel;

/// Symmetric topic dissimilarity: summed squared rank differences over all persons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    topics: usize,
    cells: Vec<u64>,
}

impl DistanceMatrix {
    pub fn from_preferences(preferences: &PreferenceModel) -> DistanceMatrix {
        let topics = preferences.topics();
        let mut cells = vec![0; topics * topics];
        for (a, b) in (0..topics).tuple_combinations() {
            let sum = (0..preferences.persons())
                .map(|person| {
                    let diff = preferences.rank(person, a).abs_diff(preferences.rank(person, b)) as u64;
                    diff * diff
                })
                .sum();
            cells[a * topics + b] = sum;
            cells[b * topics + a] = sum;
        }
        DistanceMatrix { topics, cells }
    }

    pub fn get(&self, a: TopicId, b: TopicId) -> u64 {
        self.cells[a * self.topics + b]
    }

    pub fn len(&self) -> usize {
        self.topics
    }

    pub fn is_empty(&self) -> bool {
        self.topics == 0
    }
}

/// Relabels groups in order of first appearance, so labels are dense from 0.
pub fn normalize(labels: &mut [GroupId]) {
    let mut mapping: Vec<Option<GroupId>> = vec![None; labels.len()];
    let mut next = 0;
    for label in labels.iter_mut() {
        *label = *mapping[*label].get_or_insert_with(|| {
            next += 1;
            next - 1
        });
    }
}

fn checksum(labels: &[GroupId]) -> u64 {
    let mut hasher = DefaultHasher::new();
    labels.hash(&mut hasher);
    hasher.finish()
}

/// Sum over groups of the squared intra-group distance total.
pub fn separation(distances: &DistanceMatrix, labels: &[GroupId], group_count: usize) -> u64 {
    let mut groups = vec![Vec::new(); group_count];
    for (topic, &group) in labels.iter().enumerate() {
        groups[group].push(topic);
    }
    groups
        .iter()
        .map(|members| {
            let spread: u64 = members
                .iter()
                .tuple_combinations()
                .map(|(&a, &b)| distances.get(a, b))
                .sum();
            spread * spread
        })
        .sum()
}

/// Mapping of every topic to its group; labels are always normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clustering {
    labels: Vec<GroupId>,
    group_size: usize,
}

impl Clustering {
    /// Topics `0..group_size` form group 0, the next `group_size` group 1, and so on.
    pub fn contiguous(topics: usize, group_size: usize) -> Clustering {
        Clustering { labels: (0..topics).map(|topic| topic / group_size).collect(), group_size }
    }

    pub fn from_labels(mut labels: Vec<GroupId>, group_size: usize) -> Clustering {
        normalize(&mut labels);
        Clustering { labels, group_size }
    }

    pub fn labels(&self) -> &[GroupId] {
        &self.labels
    }

    pub fn group_of(&self, topic: TopicId) -> GroupId {
        self.labels[topic]
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn group_count(&self) -> usize {
        self.labels.len() / self.group_size
    }

    /// Topics of `group` in ascending order.
    pub fn members(&self, group: GroupId) -> Vec<TopicId> {
        self.labels.iter().positions(|&label| label == group).collect()
    }

    pub fn groups(&self) -> Vec<Vec<TopicId>> {
        (0..self.group_count()).map(|group| self.members(group)).collect()
    }

    pub fn checksum(&self) -> u64 {
        checksum(&self.labels)
    }
}

/// Checksums of clusterings already handed out during a run.
#[derive(Debug, Clone, Default)]
pub struct ClusterHistory {
    seen: HashSet<u64>,
}

impl ClusterHistory {
    /// Returns `false` if the clustering was already known.
    pub fn record(&mut self, clustering: &Clustering) -> bool {
        self.seen.insert(clustering.checksum())
    }

    pub fn contains(&self, clustering: &Clustering) -> bool {
        self.seen.contains(&clustering.checksum())
    }

    fn contains_labels(&self, labels: &[GroupId]) -> bool {
        self.seen.contains(&checksum(labels))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

struct Partition<'a> {
    distances: &'a DistanceMatrix,
    history: &'a ClusterHistory,
    labels: Vec<GroupId>,
    group_size: usize,
    group_count: usize,
    best: Vec<GroupId>,
}

impl Landscape for Partition<'_> {
    type Move = TopicSwap;

    fn energy(&self) -> Score {
        -(separation(self.distances, &self.labels, self.group_count) as Score)
    }

    fn propose<R: Rng>(&mut self, rng: &mut R) -> Option<TopicSwap> {
        if self.group_count < 2 {
            return None;
        }
        let topics = self.labels.len();
        let first = rng.gen_range(0..topics);
        let pick = rng.gen_range(0..topics - self.group_size);
        let second = (0..topics)
            .filter(|&topic| self.labels[topic] != self.labels[first])
            .nth(pick)?;
        Some(TopicSwap { first, second })
    }

    fn apply(&mut self, swap: &TopicSwap) {
        self.labels.swap(swap.first, swap.second);
        normalize(&mut self.labels);
    }

    fn revert(&mut self, swap: &TopicSwap) {
        self.apply(swap);
    }

    fn admissible(&self) -> bool {
        !self.history.contains_labels(&self.labels)
    }

    fn record_best(&mut self) {
        self.best.copy_from_slice(&self.labels);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TopicClusterer<'a> {
    distances: &'a DistanceMatrix,
    acceptance: Acceptance,
}

impl<'a> TopicClusterer<'a> {
    pub fn new(distances: &'a DistanceMatrix, acceptance: Acceptance) -> TopicClusterer<'a> {
        TopicClusterer { distances, acceptance }
    }

    /// Anneals a partition into groups of `group_size` topics, returning the best
    /// one not yet in `history`. Falls back to the contiguous partition when every
    /// visited partition was already known.
    pub fn cluster(
        &self,
        group_size: usize,
        history: &ClusterHistory,
        tries: usize,
        seed: u64,
    ) -> Clustering {
        let start = Clustering::contiguous(self.distances.len(), group_size);
        let mut partition = Partition {
            distances: self.distances,
            history,
            labels: start.labels.clone(),
            group_size,
            group_count: start.group_count(),
            best: start.labels.clone(),
        };
        let mut rng = anneal::seeded_rng(seed);
        let params = Params { acceptance: self.acceptance, max_iterations: tries };
        let outcome = anneal::anneal(&mut partition, &params, &mut rng);
        match outcome.best {
            Some(energy) => tracing::trace!(
                separation = -energy,
                iterations = outcome.iterations,
                kept = outcome.kept,
                "topic clustering annealed"
            ),
            None => tracing::debug!("no unseen topic clustering found, reusing contiguous grouping"),
        }
        Clustering { labels: partition.best, group_size }
    }
}
