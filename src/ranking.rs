use std::io::{self, Write};

use crate::protocol::ResultRecord;

/// Per-query merge of result records from every worker.
///
/// Entries stay sorted by non-increasing frequency. Among equal
/// frequencies the most recently inserted entry comes first.
#[derive(Debug, Default)]
pub struct RankedList {
    entries: Vec<ResultRecord>,
}

impl RankedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` ahead of the first entry whose frequency is not
    /// greater than its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordfreq::{protocol::ResultRecord, ranking::RankedList};
    ///
    /// let mut list = RankedList::new();
    /// list.insert(ResultRecord::new(5, "a"));
    /// list.insert(ResultRecord::new(9, "b"));
    /// list.insert(ResultRecord::new(5, "c"));
    ///
    /// let names: Vec<_> = list.iter().map(|r| r.filename.as_str()).collect();
    /// assert_eq!(names, ["b", "c", "a"]);
    /// ```
    pub fn insert(&mut self, record: ResultRecord) {
        debug_assert!(!record.is_terminator());
        let pos = self
            .entries
            .partition_point(|e| e.frequency > record.frequency);
        self.entries.insert(pos, record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.entries.iter()
    }

    /// Keep the leading `capacity` entries and close them with a terminator.
    ///
    /// Since the list is already ranked, truncation drops only the
    /// lowest-frequency tail.
    pub fn finalize(mut self, capacity: usize) -> Vec<ResultRecord> {
        self.entries.truncate(capacity);
        self.entries.push(ResultRecord::terminator());
        self.entries
    }
}

/// Print one `<frequency> <filename>` line per record, up to the first
/// terminator.
pub fn write_records<W: Write>(
    out: &mut W,
    records: &[ResultRecord],
) -> io::Result<()> {
    for record in records.iter().take_while(|r| !r.is_terminator()) {
        writeln!(out, "{} {}", record.frequency, record.filename)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(records: &[ResultRecord]) -> Vec<&str> {
        records.iter().map(|r| r.filename.as_str()).collect()
    }

    #[test]
    fn first_insert_is_sole_entry() {
        let mut list = RankedList::new();
        assert!(list.is_empty());
        list.insert(ResultRecord::new(3, "only"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn equal_frequencies_rank_latest_first() {
        let mut list = RankedList::new();
        for name in ["A", "B", "C"] {
            list.insert(ResultRecord::new(5, name));
        }
        assert_eq!(names(&list.finalize(10)), ["C", "B", "A", ""]);
    }

    #[test]
    fn stays_non_increasing_for_mixed_inserts() {
        let mut list = RankedList::new();
        let freqs = [4, 1, 9, 4, 7, 1, 12, 3, 9, 2, 4];
        for (i, f) in freqs.into_iter().enumerate() {
            list.insert(ResultRecord::new(f, format!("f{i}")));
        }

        let ranked: Vec<u32> = list.iter().map(|r| r.frequency).collect();
        assert_eq!(ranked.len(), freqs.len());
        assert!(ranked.windows(2).all(|w| w[0] >= w[1]));

        // Ties among the three 4s: latest insert (f10) first.
        let fours: Vec<&str> = list
            .iter()
            .filter(|r| r.frequency == 4)
            .map(|r| r.filename.as_str())
            .collect();
        assert_eq!(fours, ["f10", "f3", "f0"]);
    }

    #[test]
    fn lower_frequency_lands_after_equal_run() {
        let mut list = RankedList::new();
        list.insert(ResultRecord::new(5, "a"));
        list.insert(ResultRecord::new(5, "b"));
        list.insert(ResultRecord::new(2, "tail"));
        list.insert(ResultRecord::new(8, "head"));
        assert_eq!(names(&list.finalize(10)), ["head", "b", "a", "tail", ""]);
    }

    #[test]
    fn finalize_keeps_highest_frequencies() {
        let mut list = RankedList::new();
        for f in 1..=10 {
            list.insert(ResultRecord::new(f, format!("f{f}")));
        }

        let bounded = list.finalize(3);
        assert_eq!(bounded.len(), 4);
        assert_eq!(names(&bounded), ["f10", "f9", "f8", ""]);
        assert!(bounded[3].is_terminator());
    }

    #[test]
    fn finalize_cuts_ties_by_insertion_order() {
        let mut list = RankedList::new();
        for name in ["old", "mid", "new"] {
            list.insert(ResultRecord::new(1, name));
        }
        assert_eq!(names(&list.finalize(2)), ["new", "mid", ""]);
    }

    #[test]
    fn finalize_empty_list_is_just_terminator() {
        let bounded = RankedList::new().finalize(100);
        assert_eq!(bounded, vec![ResultRecord::terminator()]);
    }

    #[test]
    fn write_records_stops_at_terminator() {
        let records = vec![
            ResultRecord::new(6, "f3"),
            ResultRecord::new(2, "f2"),
            ResultRecord::terminator(),
            ResultRecord::new(1, "never"),
        ];
        let mut out = Vec::new();
        write_records(&mut out, &records).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "6 f3\n2 f2\n");
    }

    #[test]
    fn write_records_prints_nothing_for_no_matches() {
        let mut out = Vec::new();
        write_records(&mut out, &[ResultRecord::terminator()]).unwrap();
        assert!(out.is_empty());
    }
}
