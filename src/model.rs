pub mod entity {
    pub type PersonId = usize;
    pub type TopicId = usize;
    pub type GroupId = usize;
    pub type RoleId = usize;
    pub type Rank = usize;
}


pub mod condition {
    use crate::error::ConfigurationError;

    pub type Score = f64;

    /// Problem size. A group is the set of topics running in parallel in one
    /// timeslot; there are `topics / sessions` groups of `sessions` topics each.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Dimensions {
        persons: usize,
        topics: usize,
        roles: usize,
        sessions: usize,
    }

    impl Dimensions {
        pub fn new(
            persons: usize,
            topics: usize,
            roles: usize,
            sessions: usize,
        ) -> Result<Dimensions, ConfigurationError> {
            for (name, value) in [
                ("persons", persons),
                ("topics", topics),
                ("roles", roles),
                ("sessions", sessions),
            ] {
                if value == 0 {
                    return Err(ConfigurationError::ZeroDimension(name));
                }
            }
            if topics % sessions != 0 {
                return Err(ConfigurationError::TopicsNotDivisible { topics, sessions });
            }
            if persons % sessions != 0 {
                return Err(ConfigurationError::PersonsNotDivisible { persons, sessions });
            }
            Ok(Dimensions { persons, topics, roles, sessions })
        }

        pub fn persons(&self) -> usize {
            self.persons
        }

        pub fn topics(&self) -> usize {
            self.topics
        }

        pub fn roles(&self) -> usize {
            self.roles
        }

        pub fn sessions(&self) -> usize {
            self.sessions
        }

        pub fn group_count(&self) -> usize {
            self.topics / self.sessions
        }

        /// Topics per group.
        pub fn group_size(&self) -> usize {
            self.sessions
        }

        pub fn persons_per_topic(&self) -> usize {
            self.persons / self.sessions
        }

        /// Every (person, group) pair needs one role.
        pub fn assignment_count(&self) -> usize {
            self.persons * self.group_count()
        }

        /// Maximum occurrences of a single role within one topic.
        pub fn topic_role_limit(&self) -> usize {
            self.persons_per_topic() / self.roles
        }

        /// Maximum occurrences of a single role across one person's topics.
        pub fn person_role_limit(&self) -> usize {
            self.group_count() / self.roles
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RoleLimits {
        pub min: usize,
        pub max: usize,
    }

    /// Per-role occupancy bounds for every topic session.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RoleQuotas(Vec<RoleLimits>);

    impl RoleQuotas {
        pub fn new(limits: Vec<RoleLimits>) -> RoleQuotas {
            RoleQuotas(limits)
        }

        /// Every role occurs equally often in each topic.
        pub fn uniform(dims: &Dimensions) -> RoleQuotas {
            let share = dims.topic_role_limit();
            RoleQuotas(vec![RoleLimits { min: share, max: share }; dims.roles()])
        }

        pub fn get(&self, role: usize) -> RoleLimits {
            self.0[role]
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn iter(&self) -> impl Iterator<Item = &RoleLimits> {
            self.0.iter()
        }

        pub fn min_total(&self) -> usize {
            self.0.iter().map(|limits| limits.min).sum()
        }

        pub fn max_total(&self) -> usize {
            self.0.iter().map(|limits| limits.max).sum()
        }

        pub fn validate(&self, dims: &Dimensions) -> Result<(), ConfigurationError> {
            if self.0.len() != dims.roles() {
                return Err(ConfigurationError::QuotaCount {
                    expected: dims.roles(),
                    found: self.0.len(),
                });
            }
            if let Some((role, limits)) = self.0.iter().enumerate().find(|(_, l)| l.min > l.max) {
                return Err(ConfigurationError::QuotaRange {
                    role,
                    min: limits.min,
                    max: limits.max,
                });
            }
            let seats = dims.persons_per_topic();
            if self.min_total() > seats || self.max_total() < seats {
                return Err(ConfigurationError::QuotaInfeasible {
                    min_total: self.min_total(),
                    max_total: self.max_total(),
                    seats,
                });
            }
            Ok(())
        }
    }
}


pub mod table {
    use std::fmt;

    use super::entity::{PersonId, RoleId, TopicId};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum Cell {
        #[default]
        NotAttending,
        AttendingPendingRole,
        AttendingWithRole(RoleId),
    }

    impl Cell {
        pub fn is_attending(&self) -> bool {
            !matches!(self, Cell::NotAttending)
        }

        pub fn role(&self) -> Option<RoleId> {
            match self {
                Cell::AttendingWithRole(role) => Some(*role),
                _ => None,
            }
        }
    }

    /// Person x topic grid of cells.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RoleMatrix {
        persons: usize,
        topics: usize,
        cells: Vec<Cell>,
    }

    impl RoleMatrix {
        pub fn new(persons: usize, topics: usize) -> RoleMatrix {
            RoleMatrix { persons, topics, cells: vec![Cell::NotAttending; persons * topics] }
        }

        pub fn persons(&self) -> usize {
            self.persons
        }

        pub fn topics(&self) -> usize {
            self.topics
        }

        pub fn get(&self, person: PersonId, topic: TopicId) -> Cell {
            self.cells[person * self.topics + topic]
        }

        pub fn set(&mut self, person: PersonId, topic: TopicId, cell: Cell) {
            self.cells[person * self.topics + topic] = cell;
        }

        pub fn row(&self, person: PersonId) -> &[Cell] {
            &self.cells[person * self.topics..(person + 1) * self.topics]
        }

        pub fn attendees(&self, topic: TopicId) -> impl Iterator<Item = PersonId> + '_ {
            (0..self.persons).filter(move |&person| self.get(person, topic).is_attending())
        }

        pub fn topics_of(&self, person: PersonId) -> impl Iterator<Item = TopicId> + '_ {
            self.row(person)
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_attending())
                .map(|(topic, _)| topic)
        }

        pub fn count_pending(&self, topic: TopicId) -> usize {
            (0..self.persons)
                .filter(|&person| self.get(person, topic) == Cell::AttendingPendingRole)
                .count()
        }

        pub fn has_pending(&self) -> bool {
            self.cells.iter().any(|cell| *cell == Cell::AttendingPendingRole)
        }

        /// Turns every assigned role back into a pending one.
        pub fn clear_roles(&mut self) {
            for cell in self.cells.iter_mut() {
                if cell.role().is_some() {
                    *cell = Cell::AttendingPendingRole;
                }
            }
        }
    }

    impl fmt::Display for RoleMatrix {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "     ")?;
            for topic in 0..self.topics {
                write!(f, " T{:<3}", topic)?;
            }
            writeln!(f)?;
            for person in 0..self.persons {
                write!(f, "P{:<4}", person)?;
                for cell in self.row(person) {
                    match cell {
                        Cell::NotAttending => write!(f, "  .  ")?,
                        Cell::AttendingPendingRole => write!(f, "  *  ")?,
                        Cell::AttendingWithRole(role) => write!(f, "  {:<3}", role)?,
                    }
                }
                writeln!(f)?;
            }
            Ok(())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::condition::{Dimensions, RoleLimits, RoleQuotas};
    use super::table::{Cell, RoleMatrix};
    use crate::error::ConfigurationError;

    #[test]
    fn test_dimensions_reject_uneven_split() {
        assert_eq!(
            Dimensions::new(4, 5, 1, 2),
            Err(ConfigurationError::TopicsNotDivisible { topics: 5, sessions: 2 })
        );
        assert_eq!(
            Dimensions::new(5, 4, 1, 2),
            Err(ConfigurationError::PersonsNotDivisible { persons: 5, sessions: 2 })
        );
        assert_eq!(Dimensions::new(4, 4, 0, 2), Err(ConfigurationError::ZeroDimension("roles")));
    }

    #[test]
    fn test_dimensions_derived_limits() {
        let dims = Dimensions::new(6, 6, 3, 2).unwrap();
        assert_eq!(dims.group_count(), 3);
        assert_eq!(dims.group_size(), 2);
        assert_eq!(dims.persons_per_topic(), 3);
        assert_eq!(dims.assignment_count(), 18);
        assert_eq!(dims.topic_role_limit(), 1);
        assert_eq!(dims.person_role_limit(), 1);
    }

    #[test]
    fn test_quotas_must_cover_seats() {
        let dims = Dimensions::new(8, 4, 2, 2).unwrap();
        assert!(RoleQuotas::uniform(&dims).validate(&dims).is_ok());

        let short = RoleQuotas::new(vec![RoleLimits { min: 0, max: 1 }, RoleLimits { min: 0, max: 2 }]);
        assert!(matches!(short.validate(&dims), Err(ConfigurationError::QuotaInfeasible { .. })));

        let inverted = RoleQuotas::new(vec![RoleLimits { min: 3, max: 1 }, RoleLimits { min: 0, max: 4 }]);
        assert_eq!(
            inverted.validate(&dims),
            Err(ConfigurationError::QuotaRange { role: 0, min: 3, max: 1 })
        );

        let missing = RoleQuotas::new(vec![RoleLimits { min: 0, max: 4 }]);
        assert_eq!(
            missing.validate(&dims),
            Err(ConfigurationError::QuotaCount { expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_matrix_queries() {
        let mut matrix = RoleMatrix::new(2, 3);
        matrix.set(0, 1, Cell::AttendingPendingRole);
        matrix.set(1, 1, Cell::AttendingWithRole(0));
        matrix.set(1, 2, Cell::AttendingPendingRole);

        assert_eq!(matrix.attendees(1).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(matrix.topics_of(1).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(matrix.count_pending(1), 1);

        matrix.clear_roles();
        assert_eq!(matrix.get(1, 1), Cell::AttendingPendingRole);
        assert_eq!(matrix.get(0, 0), Cell::NotAttending);
    }
}
