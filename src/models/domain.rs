use std::collections::HashSet;

/// Opaque member identifier as reported by the messaging service
pub type Member = String;

/// Two distinct members paired for a coffee
///
/// Pairs are unordered: `Couple::new("a", "b") == Couple::new("b", "a")`.
#[derive(Debug, Clone, Eq)]
pub struct Couple {
    pub first: Member,
    pub second: Member,
}

impl Couple {
    pub fn new(first: impl Into<Member>, second: impl Into<Member>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Whether `member` is one side of this pair
    pub fn contains(&self, member: &str) -> bool {
        self.first == member || self.second == member
    }

    pub fn members(&self) -> [&str; 2] {
        [&self.first, &self.second]
    }
}

impl PartialEq for Couple {
    fn eq(&self, other: &Self) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }
}

/// Members already matched during the current period
///
/// Insertion order is kept so the persisted file is stable between runs.
/// Duplicates are tolerated; only membership matters.
#[derive(Debug, Clone, Default)]
pub struct MatchRecord {
    members: Vec<Member>,
    /// Same members as `members`, for constant time lookups
    index: HashSet<Member>,
}

impl MatchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, member: &str) -> bool {
        self.index.contains(member)
    }

    pub fn push(&mut self, member: impl Into<Member>) {
        let member = member.into();
        self.index.insert(member.clone());
        self.members.push(member);
    }

    /// Record both sides of a freshly made pair
    pub fn record(&mut self, couple: &Couple) {
        self.push(couple.first.clone());
        self.push(couple.second.clone());
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }
}

// The index is derived from `members`, so only the ordered list is compared
impl PartialEq for MatchRecord {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for MatchRecord {}

impl FromIterator<Member> for MatchRecord {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        let mut record = Self::default();
        for member in iter {
            record.push(member);
        }
        record
    }
}

/// Result of splitting today's queue into pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub matches: Vec<Couple>,
    /// Members left for the following working days
    pub residual: Vec<Member>,
}

/// What a single daily run ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Weekend or configured day off; nothing fetched or announced
    OffDay,
    /// Everyone on the roster already had a coffee this period
    EmptyQueue,
    /// A lone member was left and nobody else was on the roster
    Alone { member: Member },
    Matched {
        couples: Vec<Couple>,
        days_remaining: u32,
    },
}

impl RunOutcome {
    /// Couples announced by this run
    pub fn couples(&self) -> &[Couple] {
        match self {
            RunOutcome::Matched { couples, .. } => couples,
            _ => &[],
        }
    }
}
