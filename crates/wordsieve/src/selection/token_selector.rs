use crate::{
    embeddings::{EmbeddingHeader, EmbeddingRecord, EmbeddingSource},
    errors::{WSResult, WordsieveError},
    frequency::{FrequencyEntry, FrequencySource, ranked_entries},
    selection::SelectionSet,
    types::{Rank, WSHashSet, hash_map_with_capacity, hash_set_new},
};

/// Options for [`TokenSelector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSelectorOptions {
    /// The maximum number of tokens to select.
    pub vocab_size: usize,

    /// Scan the frequency list and the embedding table concurrently.
    ///
    /// Only has an effect with the `rayon` feature.
    pub parallel: bool,
}

impl TokenSelectorOptions {
    /// Create new options.
    ///
    /// ## Arguments
    /// * `vocab_size` - the maximum number of tokens to select.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            parallel: false,
        }
    }

    /// Sets the maximum number of tokens to select.
    pub fn with_vocab_size(
        self,
        vocab_size: usize,
    ) -> Self {
        Self { vocab_size, ..self }
    }

    /// Sets whether the reader passes run concurrently.
    pub fn with_parallel(
        self,
        parallel: bool,
    ) -> Self {
        Self { parallel, ..self }
    }

    /// Validate the options and build a [`TokenSelector`].
    pub fn init(self) -> WSResult<TokenSelector> {
        if self.vocab_size == 0 {
            return Err(WordsieveError::InvalidConfig(
                "vocab_size must be positive".to_string(),
            ));
        }
        Ok(TokenSelector { options: self })
    }
}

/// A token chosen by [`TokenSelector`].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedToken {
    /// The token's rank in the full frequency list.
    pub rank: Rank,

    /// The token's frequency list entry.
    pub entry: FrequencyEntry,

    /// The token's embedding record.
    pub record: EmbeddingRecord,
}

/// The result of a selection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The embedding dimensionality.
    pub dims: usize,

    /// The selected tokens, in rank order.
    pub tokens: Vec<SelectedToken>,

    /// The number of distinct tokens with embedding vectors.
    pub covered: usize,

    /// The number of ranked frequency entries examined.
    pub scanned: usize,
}

impl Selection {
    /// The number of selected tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the selection empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The selected tokens as a [`SelectionSet`].
    pub fn selection_set(&self) -> SelectionSet {
        self.tokens.iter().map(|t| t.entry.token.as_str()).collect()
    }

    /// The selected frequency entries, in rank order.
    pub fn frequency_entries(&self) -> impl ExactSizeIterator<Item = &FrequencyEntry> {
        self.tokens.iter().map(|t| &t.entry)
    }

    /// The selected embedding records, in rank order.
    pub fn embedding_records(&self) -> impl ExactSizeIterator<Item = &EmbeddingRecord> {
        self.tokens.iter().map(|t| &t.record)
    }
}

/// Selects the highest-ranked tokens which have embedding coverage.
#[derive(Debug, Clone)]
pub struct TokenSelector {
    options: TokenSelectorOptions,
}

type Candidates = Vec<(Rank, FrequencyEntry)>;

impl TokenSelector {
    /// The selector options.
    pub fn options(&self) -> &TokenSelectorOptions {
        &self.options
    }

    /// Select up to `vocab_size` covered tokens.
    ///
    /// The embedding source is read twice: once to collect the covered token
    /// set, and once to pick up vectors for the selected tokens. Neither pass
    /// holds more than one unselected vector in memory.
    ///
    /// ## Errors
    /// * [`WordsieveError::MalformedInput`] from either reader, including
    ///   frequency lines past the last selected token.
    /// * [`WordsieveError::InsufficientCoverage`] if no token is covered.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, frequencies, embeddings)))]
    pub fn select<F, E>(
        &self,
        frequencies: &F,
        embeddings: &E,
    ) -> WSResult<Selection>
    where
        F: FrequencySource + Sync + ?Sized,
        E: EmbeddingSource + Sync + ?Sized,
    {
        let (header, coverage, candidates, scanned) = self.scan(frequencies, embeddings)?;

        log::info!(
            "selected {} of {} requested tokens; {} covered, {} ranked entries scanned",
            candidates.len(),
            self.options.vocab_size,
            coverage.len(),
            scanned
        );

        if candidates.is_empty() {
            return Err(WordsieveError::InsufficientCoverage {
                requested: self.options.vocab_size,
            });
        }
        if candidates.len() < self.options.vocab_size {
            log::warn!(
                "only {} covered tokens available; requested {}",
                candidates.len(),
                self.options.vocab_size
            );
        }

        let tokens = attach_vectors(embeddings, &header, candidates)?;

        Ok(Selection {
            dims: header.dims,
            tokens,
            covered: coverage.len(),
            scanned,
        })
    }

    fn scan<F, E>(
        &self,
        frequencies: &F,
        embeddings: &E,
    ) -> WSResult<ScanResult>
    where
        F: FrequencySource + Sync + ?Sized,
        E: EmbeddingSource + Sync + ?Sized,
    {
        let limit = self.options.vocab_size;
        if self.options.parallel {
            scan_parallel(frequencies, embeddings, limit)
        } else {
            scan_sequential(frequencies, embeddings, limit)
        }
    }
}

/// `(header, coverage, candidates, scanned)`.
type ScanResult = (EmbeddingHeader, WSHashSet<String>, Candidates, usize);

fn scan_sequential<F, E>(
    frequencies: &F,
    embeddings: &E,
    limit: usize,
) -> WSResult<ScanResult>
where
    F: FrequencySource + ?Sized,
    E: EmbeddingSource + ?Sized,
{
    let (header, coverage) = scan_coverage(embeddings)?;
    let (candidates, scanned) =
        pick_covered(ranked_entries(frequencies.open_entries()?), &coverage, limit)?;
    Ok((header, coverage, candidates, scanned))
}

/// Run the coverage pass and a full frequency pass concurrently, then join
/// them on token identity.
#[cfg(feature = "rayon")]
fn scan_parallel<F, E>(
    frequencies: &F,
    embeddings: &E,
    limit: usize,
) -> WSResult<ScanResult>
where
    F: FrequencySource + Sync + ?Sized,
    E: EmbeddingSource + Sync + ?Sized,
{
    let (coverage, ranked) = rayon::join(
        || scan_coverage(embeddings),
        || -> WSResult<Candidates> { ranked_entries(frequencies.open_entries()?).collect() },
    );
    let (header, coverage) = coverage?;
    let (candidates, scanned) = pick_covered(ranked?.into_iter().map(Ok), &coverage, limit)?;
    Ok((header, coverage, candidates, scanned))
}

#[cfg(not(feature = "rayon"))]
fn scan_parallel<F, E>(
    frequencies: &F,
    embeddings: &E,
    limit: usize,
) -> WSResult<ScanResult>
where
    F: FrequencySource + Sync + ?Sized,
    E: EmbeddingSource + Sync + ?Sized,
{
    log::debug!("parallel selection requested without the `rayon` feature");
    scan_sequential(frequencies, embeddings, limit)
}

/// Collect the set of tokens which have a vector.
fn scan_coverage<E>(embeddings: &E) -> WSResult<(EmbeddingHeader, WSHashSet<String>)>
where
    E: EmbeddingSource + ?Sized,
{
    let (header, records) = embeddings.open_records()?;
    let mut coverage = hash_set_new();
    for record in records {
        coverage.insert(record?.token);
    }
    log::debug!(
        "coverage pass: {} distinct tokens of {} declared",
        coverage.len(),
        header.count
    );
    Ok((header, coverage))
}

/// Walk ranked entries, keeping covered tokens until `limit` are kept.
///
/// Entries past the last kept token are still read, so a malformed line
/// anywhere in the list fails the selection.
fn pick_covered<I>(
    ranked: I,
    coverage: &WSHashSet<String>,
    limit: usize,
) -> WSResult<(Candidates, usize)>
where
    I: IntoIterator<Item = WSResult<(Rank, FrequencyEntry)>>,
{
    let mut ranked = ranked.into_iter();
    let mut candidates = Vec::with_capacity(limit.min(coverage.len()));
    let mut scanned = 0;
    for item in ranked.by_ref() {
        let (rank, entry) = item?;
        scanned += 1;
        if coverage.contains(&entry.token) {
            candidates.push((rank, entry));
            if candidates.len() == limit {
                break;
            }
        }
    }

    let mut trailing = 0;
    for item in ranked {
        item?;
        trailing += 1;
    }
    log::debug!("validated {trailing} entries past the selection");

    Ok((candidates, scanned))
}

/// Second embedding pass; pick up the first vector of each candidate.
fn attach_vectors<E>(
    embeddings: &E,
    expected: &EmbeddingHeader,
    candidates: Candidates,
) -> WSResult<Vec<SelectedToken>>
where
    E: EmbeddingSource + ?Sized,
{
    let mut slots = hash_map_with_capacity(candidates.len());
    for (idx, (_, entry)) in candidates.iter().enumerate() {
        slots.insert(entry.token.clone(), idx);
    }

    let (header, records) = embeddings.open_records()?;
    if header != *expected {
        return Err(WordsieveError::malformed(
            "embedding table",
            format_args!("header changed between passes: {expected:?} -> {header:?}"),
        ));
    }

    let mut vectors: Vec<Option<Vec<f32>>> = vec![None; candidates.len()];
    let mut remaining = candidates.len();
    for record in records {
        let record = record?;
        if let Some(&idx) = slots.get(&record.token)
            && vectors[idx].is_none()
        {
            vectors[idx] = Some(record.vector);
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
    }

    candidates
        .into_iter()
        .zip(vectors)
        .map(|((rank, entry), vector)| {
            let vector = vector.ok_or_else(|| {
                WordsieveError::malformed(
                    "embedding table",
                    format_args!("vector for {:?} disappeared between passes", entry.token),
                )
            })?;
            let record = EmbeddingRecord::new(entry.token.clone(), vector);
            Ok(SelectedToken {
                rank,
                entry,
                record,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;
    use crate::{embeddings::EmbeddingTable, frequency::FrequencyListFile};

    fn frequencies(items: &[(&str, u64)]) -> Vec<FrequencyEntry> {
        items
            .iter()
            .map(|&(t, c)| FrequencyEntry::new(t, c))
            .collect()
    }

    fn embeddings(tokens: &[&str]) -> EmbeddingTable {
        let records = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| EmbeddingRecord::new(*t, vec![i as f32, -(i as f32)]))
            .collect();
        EmbeddingTable::new(2, records).unwrap()
    }

    fn selected_tokens(selection: &Selection) -> Vec<(Rank, &str)> {
        selection
            .tokens
            .iter()
            .map(|t| (t.rank, t.entry.token.as_str()))
            .collect()
    }

    fn selectors(vocab_size: usize) -> Vec<TokenSelector> {
        [false, true]
            .into_iter()
            .map(|parallel| {
                TokenSelectorOptions::new(vocab_size)
                    .with_parallel(parallel)
                    .init()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_zero_vocab_size_rejected() {
        assert!(TokenSelectorOptions::new(0).init().is_err());
        assert_eq!(
            TokenSelectorOptions::new(3)
                .with_vocab_size(5)
                .init()
                .unwrap()
                .options()
                .vocab_size,
            5
        );
    }

    #[test]
    fn test_uncovered_tokens_are_skipped() {
        let freqs = frequencies(&[("kissa", 100), ("koira", 90), ("talo", 80)]);
        let table = embeddings(&["talo", "kissa"]);

        for selector in selectors(2) {
            let selection = selector.select(&freqs, &table).unwrap();
            assert_eq!(selected_tokens(&selection), vec![(1, "kissa"), (3, "talo")]);
            assert_eq!(selection.dims, 2);
            assert_eq!(selection.covered, 2);

            // Vectors come from the table, not from selection order.
            assert_eq!(selection.tokens[0].record.vector, vec![1.0, -1.0]);
            assert_eq!(selection.tokens[1].record.vector, vec![0.0, -0.0]);

            let set = selection.selection_set();
            assert!(set.contains("kissa") && set.contains("talo") && !set.contains("koira"));
        }
    }

    #[test]
    fn test_undersized_selection_is_not_an_error() {
        let freqs = frequencies(&[("kissa", 100), ("koira", 90), ("talo", 80)]);
        let table = embeddings(&["kissa", "talo"]);

        for selector in selectors(5) {
            let selection = selector.select(&freqs, &table).unwrap();
            assert_eq!(selection.len(), 2);
            assert_eq!(selection.scanned, 3);
        }
    }

    #[test]
    fn test_stops_at_vocab_size() {
        let freqs = frequencies(&[("a", 9), ("b", 8), ("c", 7), ("d", 6)]);
        let table = embeddings(&["a", "b", "c", "d"]);

        let selector = TokenSelectorOptions::new(2).init().unwrap();
        let selection = selector.select(&freqs, &table).unwrap();
        assert_eq!(selected_tokens(&selection), vec![(1, "a"), (2, "b")]);
        assert_eq!(selection.scanned, 2);
    }

    #[test]
    fn test_ties_keep_file_order() {
        let freqs = frequencies(&[("zeta", 5), ("alpha", 5), ("mid", 5), ("beta", 5)]);
        let table = embeddings(&["beta", "alpha", "zeta", "mid"]);

        for selector in selectors(3) {
            let selection = selector.select(&freqs, &table).unwrap();
            assert_eq!(
                selected_tokens(&selection),
                vec![(1, "zeta"), (2, "alpha"), (3, "mid")]
            );
        }
    }

    #[test]
    fn test_duplicate_tokens_first_wins() {
        let freqs = frequencies(&[("a", 9), ("a", 8), ("b", 7)]);
        let table = EmbeddingTable::new(
            1,
            vec![
                EmbeddingRecord::new("b", vec![1.0]),
                EmbeddingRecord::new("a", vec![2.0]),
                EmbeddingRecord::new("a", vec![3.0]),
            ],
        )
        .unwrap();

        for selector in selectors(5) {
            let selection = selector.select(&freqs, &table).unwrap();
            assert_eq!(selected_tokens(&selection), vec![(1, "a"), (2, "b")]);
            assert_eq!(selection.tokens[0].record.vector, vec![2.0]);
        }
    }

    #[test]
    fn test_no_coverage_is_an_error() {
        let freqs = frequencies(&[("kissa", 100), ("koira", 90)]);
        let table = embeddings(&["auto"]);

        for selector in selectors(2) {
            let err = selector.select(&freqs, &table).unwrap_err();
            assert!(matches!(
                err,
                WordsieveError::InsufficientCoverage { requested: 2 }
            ));
        }
    }

    #[test]
    fn test_malformed_line_after_selection_fails() {
        let dir = TempDir::new("token_selector").unwrap();
        let path = dir.path().join("freqs.txt");
        std::fs::write(&path, "kissa\t100\ntalo\n").unwrap();

        let freqs = FrequencyListFile::new(&path);
        let table = embeddings(&["kissa"]);

        for selector in selectors(1) {
            let err = selector.select(&freqs, &table).unwrap_err();
            assert!(err.is_malformed(), "{err}");
            assert!(err.to_string().contains("freqs.txt:2"), "{err}");
        }
    }

    #[test]
    fn test_increasing_count_after_selection_fails() {
        let freqs = frequencies(&[("a", 9), ("b", 8), ("c", 20)]);
        let table = embeddings(&["a", "b"]);

        for selector in selectors(1) {
            let err = selector.select(&freqs, &table).unwrap_err();
            assert!(err.is_malformed(), "{err}");
        }
    }

    #[test]
    fn test_malformed_frequencies_propagate() {
        let freqs = frequencies(&[("a", 1), ("b", 5)]);
        let table = embeddings(&["a", "b"]);

        for selector in selectors(2) {
            let err = selector.select(&freqs, &table).unwrap_err();
            assert!(err.is_malformed(), "{err}");
        }
    }
}
