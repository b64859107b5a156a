use crate::model::entity::{GroupId, PersonId, TopicId};

/// A person's attendance of one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub person: PersonId,
    pub topic: TopicId,
}

/// Exchanges the group labels of two topics from different groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicSwap {
    pub first: TopicId,
    pub second: TopicId,
}

/// Two persons of the same group trade their topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceSwap {
    pub group: GroupId,
    pub first: Seat,
    pub second: Seat,
}

impl AttendanceSwap {
    /// Seats held after the swap has been applied.
    pub fn traded(&self) -> (Seat, Seat) {
        (
            Seat { person: self.first.person, topic: self.second.topic },
            Seat { person: self.second.person, topic: self.first.topic },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traded_seats() {
        let swap = AttendanceSwap {
            group: 1,
            first: Seat { person: 0, topic: 2 },
            second: Seat { person: 3, topic: 5 },
        };
        let (first, second) = swap.traded();
        assert_eq!(first, Seat { person: 0, topic: 5 });
        assert_eq!(second, Seat { person: 3, topic: 2 });
    }
}
