use crate::{
    errors::WSResult,
    frequency::{FrequencyEntry, FrequencySource, RankedEntries, ranked_entries},
    lexical::LexicalRecord,
    selection::SelectionSet,
};

/// Joins a full frequency list against a [`SelectionSet`].
///
/// The frequency source is read twice: once to total the counts, and once
/// lazily by [`LexicalRecords`]. No per-token state beyond the duplicate
/// filter is kept in memory.
pub struct LexicalDataBuilder<'a, F: FrequencySource + ?Sized> {
    frequencies: &'a F,
    selection: SelectionSet,
    total: Option<u128>,
}

impl<'a, F> LexicalDataBuilder<'a, F>
where
    F: FrequencySource + Sync + ?Sized,
{
    /// Create a builder over `frequencies` and an already loaded selection.
    pub fn new(
        frequencies: &'a F,
        selection: SelectionSet,
    ) -> Self {
        Self {
            frequencies,
            selection,
            total: None,
        }
    }

    /// Create a builder whose selection is loaded from a pruned frequency list.
    ///
    /// With `parallel` and the `rayon` feature, the count total and the
    /// selection set are loaded concurrently.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(frequencies, pruned)))]
    pub fn from_pruned<P>(
        frequencies: &'a F,
        pruned: &P,
        parallel: bool,
    ) -> WSResult<Self>
    where
        P: FrequencySource + Sync + ?Sized,
    {
        let (total, selection) = if parallel {
            load_parallel(frequencies, pruned)?
        } else {
            (
                total_count(frequencies)?,
                SelectionSet::from_frequency_source(pruned)?,
            )
        };
        Ok(Self {
            frequencies,
            selection,
            total: Some(total),
        })
    }

    /// Use a precomputed count total, skipping the totalling pass.
    pub fn with_total(
        self,
        total: u128,
    ) -> Self {
        Self {
            total: Some(total),
            ..self
        }
    }

    /// The selected token set.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Total the counts (if needed) and start the record pass.
    pub fn build(self) -> WSResult<LexicalRecords<F::Entries<'a>>> {
        let total = match self.total {
            Some(total) => total,
            None => total_count(self.frequencies)?,
        };
        log::debug!(
            "lexical data: total count {total}, {} selected tokens",
            self.selection.len()
        );

        Ok(LexicalRecords {
            ranked: ranked_entries(self.frequencies.open_entries()?),
            selection: self.selection,
            total,
        })
    }
}

/// Lazily yields one [`LexicalRecord`] per ranked frequency entry.
pub struct LexicalRecords<I> {
    ranked: RankedEntries<I>,
    selection: SelectionSet,
    total: u128,
}

impl<I> LexicalRecords<I> {
    /// The sum of all counts in the list.
    pub fn total(&self) -> u128 {
        self.total
    }
}

impl<I> Iterator for LexicalRecords<I>
where
    I: Iterator<Item = WSResult<FrequencyEntry>>,
{
    type Item = WSResult<LexicalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let (rank, entry) = match self.ranked.next()? {
            Ok(item) => item,
            Err(err) => return Some(Err(err)),
        };

        let probability = if self.total == 0 {
            0.0
        } else {
            entry.count as f64 / self.total as f64
        };
        let is_selected = self.selection.contains(&entry.token);

        Some(Ok(LexicalRecord {
            token: entry.token,
            rank,
            count: entry.count,
            probability,
            is_selected,
        }))
    }
}

/// Sum every count of the ranked, deduplicated list.
pub fn total_count<F>(frequencies: &F) -> WSResult<u128>
where
    F: FrequencySource + ?Sized,
{
    let mut total: u128 = 0;
    for item in ranked_entries(frequencies.open_entries()?) {
        let (_, entry) = item?;
        total += entry.count as u128;
    }
    Ok(total)
}

#[cfg(feature = "rayon")]
fn load_parallel<F, P>(
    frequencies: &F,
    pruned: &P,
) -> WSResult<(u128, SelectionSet)>
where
    F: FrequencySource + Sync + ?Sized,
    P: FrequencySource + Sync + ?Sized,
{
    let (total, selection) = rayon::join(
        || total_count(frequencies),
        || SelectionSet::from_frequency_source(pruned),
    );
    Ok((total?, selection?))
}

#[cfg(not(feature = "rayon"))]
fn load_parallel<F, P>(
    frequencies: &F,
    pruned: &P,
) -> WSResult<(u128, SelectionSet)>
where
    F: FrequencySource + Sync + ?Sized,
    P: FrequencySource + Sync + ?Sized,
{
    log::debug!("parallel lexical load requested without the `rayon` feature");
    Ok((
        total_count(frequencies)?,
        SelectionSet::from_frequency_source(pruned)?,
    ))
}
