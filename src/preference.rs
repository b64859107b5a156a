//! Ranked topic preferences of every person.
//!
//! Each person holds a permutation `topic_at_rank` of the topics (rank 0 is the
//! favourite) together with its inverse `rank_of_topic`. Every mutation keeps
//! both arrays exact inverses of each other.

use itertools::Itertools;
use rand::Rng;

use crate::error::ConfigurationError;
use crate::model::entity::{PersonId, Rank, TopicId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceModel {
    persons: usize,
    topics: usize,
    topic_at_rank: Vec<TopicId>,
    rank_of_topic: Vec<Rank>,
}

impl PreferenceModel {
    /// Every person ranks topics in their natural order.
    pub fn new(persons: usize, topics: usize) -> PreferenceModel {
        let topic_at_rank = (0..persons).flat_map(|_| 0..topics).collect::<Vec<_>>();
        let rank_of_topic = topic_at_rank.clone();
        PreferenceModel { persons, topics, topic_at_rank, rank_of_topic }
    }

    /// Builds the model from one ranked topic list per person.
    pub fn from_rankings(
        topics: usize,
        rankings: &[Vec<TopicId>],
    ) -> Result<PreferenceModel, ConfigurationError> {
        let persons = rankings.len();
        if let Some(row) = rankings.iter().find(|row| row.len() != topics) {
            return Err(ConfigurationError::PreferenceShape {
                persons,
                topics,
                found_persons: persons,
                found_topics: row.len(),
            });
        }
        for (person, row) in rankings.iter().enumerate() {
            let mut seen = vec![false; topics];
            for &topic in row {
                if topic >= topics || std::mem::replace(&mut seen[topic], true) {
                    return Err(ConfigurationError::NotAPermutation { person });
                }
            }
        }
        let mut model = PreferenceModel {
            persons,
            topics,
            topic_at_rank: rankings.concat(),
            rank_of_topic: vec![0; persons * topics],
        };
        model.rebuild_inverse();
        Ok(model)
    }

    pub fn persons(&self) -> usize {
        self.persons
    }

    pub fn topics(&self) -> usize {
        self.topics
    }

    pub fn rank(&self, person: PersonId, topic: TopicId) -> Rank {
        self.rank_of_topic[person * self.topics + topic]
    }

    pub fn topic_at(&self, person: PersonId, rank: Rank) -> TopicId {
        self.topic_at_rank[person * self.topics + rank]
    }

    /// The person's topics, most preferred first.
    pub fn ranking(&self, person: PersonId) -> &[TopicId] {
        &self.topic_at_rank[person * self.topics..(person + 1) * self.topics]
    }

    /// Places `topic` at `index`; the topic previously at `index` takes the
    /// former rank of `topic`.
    pub fn set_preference_at(&mut self, person: PersonId, index: Rank, topic: TopicId) {
        let current = self.rank(person, topic);
        self.swap(person, index, current);
    }

    pub fn swap(&mut self, person: PersonId, first: Rank, second: Rank) {
        if first == second {
            return;
        }
        let base = person * self.topics;
        self.topic_at_rank.swap(base + first, base + second);
        self.rank_of_topic[base + self.topic_at_rank[base + first]] = first;
        self.rank_of_topic[base + self.topic_at_rank[base + second]] = second;
    }

    pub fn rebuild_inverse(&mut self) {
        for person in 0..self.persons {
            let base = person * self.topics;
            for rank in 0..self.topics {
                self.rank_of_topic[base + self.topic_at_rank[base + rank]] = rank;
            }
        }
    }

    pub fn is_consistent(&self) -> bool {
        (0..self.persons).all(|person| {
            (0..self.topics).all(|topic| self.topic_at(person, self.rank(person, topic)) == topic)
        })
    }

    /// Scrambles every ranking with `swaps` random transpositions.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R, swaps: usize) {
        for person in 0..self.persons {
            for _ in 0..swaps {
                let first = rng.gen_range(0..self.topics);
                let second = rng.gen_range(0..self.topics);
                self.swap(person, first, second);
            }
        }
    }

    /// Summed rank per topic; lower means more popular.
    pub fn topic_popularity(&self) -> Vec<usize> {
        (0..self.topics)
            .map(|topic| (0..self.persons).map(|person| self.rank(person, topic)).sum())
            .collect()
    }

    pub fn topics_by_popularity(&self) -> Vec<TopicId> {
        let popularity = self.topic_popularity();
        (0..self.topics).sorted_by_key(|&topic| popularity[topic]).collect()
    }
}
