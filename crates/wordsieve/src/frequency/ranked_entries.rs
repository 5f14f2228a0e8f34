use crate::{
    errors::{WSResult, WordsieveError},
    frequency::FrequencyEntry,
    types::{Count, Rank, WSHashSet, hash_set_new},
};

/// Rank a raw entry stream.
///
/// See [`RankedEntries`].
pub fn ranked_entries<I>(entries: I) -> RankedEntries<I::IntoIter>
where
    I: IntoIterator<Item = WSResult<FrequencyEntry>>,
{
    RankedEntries::new(entries.into_iter())
}

/// Assigns 1-based ranks to a frequency entry stream, in stream order.
///
/// * Counts must be non-increasing; an entry whose count exceeds its
///   predecessor's ends the stream with [`WordsieveError::MalformedInput`].
/// * Duplicate tokens are first-wins: later occurrences are dropped and do
///   not consume a rank.
///
/// Ties keep their stream order, so ranks are stable.
pub struct RankedEntries<I> {
    inner: I,
    seen: WSHashSet<String>,
    position: usize,
    prev_count: Option<Count>,
    next_rank: Rank,
    done: bool,
}

impl<I> RankedEntries<I>
where
    I: Iterator<Item = WSResult<FrequencyEntry>>,
{
    /// Wrap an entry iterator.
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            seen: hash_set_new(),
            position: 0,
            prev_count: None,
            next_rank: 1,
            done: false,
        }
    }

    /// The number of ranks assigned so far.
    pub fn ranked_count(&self) -> usize {
        self.next_rank - 1
    }

    fn check_order(
        &mut self,
        entry: &FrequencyEntry,
    ) -> WSResult<()> {
        self.position += 1;
        if let Some(prev) = self.prev_count
            && entry.count > prev
        {
            return Err(WordsieveError::malformed(
                format_args!("entry {}", self.position),
                format_args!(
                    "count {} for {:?} exceeds the previous count {prev}; \
                     frequency lists must be sorted by descending count",
                    entry.count, entry.token
                ),
            ));
        }
        self.prev_count = Some(entry.count);
        Ok(())
    }
}

impl<I> Iterator for RankedEntries<I>
where
    I: Iterator<Item = WSResult<FrequencyEntry>>,
{
    type Item = WSResult<(Rank, FrequencyEntry)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if let Err(e) = self.check_order(&entry) {
                self.done = true;
                return Some(Err(e));
            }

            if !self.seen.insert(entry.token.clone()) {
                log::warn!(
                    "dropping duplicate token {:?} (count {}) at entry {}",
                    entry.token,
                    entry.count,
                    self.position
                );
                continue;
            }

            let rank = self.next_rank;
            self.next_rank += 1;
            return Some(Ok((rank, entry)));
        }
    }
}
