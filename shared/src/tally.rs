use crate::models::{OptionTally, PollId, Vote, VoteKind};

/// Ballot counts for one poll, keyed by option label.
///
/// Options registered by seed rows come first, in the order they were
/// declared. Ballots naming a label no seed row declared are still counted
/// and appended after the declared options, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    poll: Option<PollId>,
    counts: Vec<(String, usize)>,
    total_ballots: usize,
}

impl Tally {
    pub fn from_votes(votes: &[Vote]) -> Self {
        let mut tally = Self {
            poll: votes.first().map(|v| v.poll),
            ..Self::default()
        };

        for vote in votes.iter().filter(|v| v.kind == VoteKind::Seed) {
            tally.entry(&vote.option);
        }

        for vote in votes.iter().filter(|v| v.is_ballot()) {
            *tally.entry(&vote.option) += 1;
            tally.total_ballots += 1;
        }

        tally
    }

    fn entry(&mut self, option: &str) -> &mut usize {
        let idx = match self.counts.iter().position(|(label, _)| label == option) {
            Some(idx) => idx,
            None => {
                self.counts.push((option.to_owned(), 0));
                self.counts.len() - 1
            }
        };
        &mut self.counts[idx].1
    }

    pub fn poll(&self) -> Option<PollId> { self.poll }

    pub fn total_ballots(&self) -> usize { self.total_ballots }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.counts.iter().map(|(label, _)| label.as_str())
    }

    pub fn count(&self, option: &str) -> Option<usize> {
        self.counts.iter()
            .find(|(label, _)| label == option)
            .map(|&(_, count)| count)
    }

    /// Share of all ballots cast for `option`, in percent. Zero when no
    /// ballots have been cast yet.
    pub fn percentage(&self, option: &str) -> Option<f64> {
        self.count(option).map(|count| self.percentage_of(count))
    }

    fn percentage_of(&self, count: usize) -> f64 {
        if self.total_ballots == 0 {
            0.0
        } else {
            count as f64 / self.total_ballots as f64 * 100.0
        }
    }

    /// Each option's share in hundredths of a percent. Rounding leftovers go
    /// to the largest remainders, so the shares add up to exactly 100%.
    fn hundredths(&self) -> Vec<u64> {
        if self.total_ballots == 0 {
            return vec![0; self.counts.len()];
        }

        let total = self.total_ballots as u64;
        let mut shares: Vec<u64> = Vec::with_capacity(self.counts.len());
        let mut remainders: Vec<(usize, u64)> = Vec::with_capacity(self.counts.len());
        for (idx, &(_, count)) in self.counts.iter().enumerate() {
            let scaled = count as u64 * 10_000;
            shares.push(scaled / total);
            remainders.push((idx, scaled % total));
        }

        let leftover = 10_000 - shares.iter().sum::<u64>();
        remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for &(idx, _) in remainders.iter().take(leftover as usize) {
            shares[idx] += 1;
        }
        shares
    }

    pub fn into_results(self, include_share: bool) -> Vec<OptionTally> {
        let poll = self.poll.map(|id| id.to_string());
        let shares = if include_share { self.hundredths() } else { Vec::new() };
        self.counts.into_iter()
            .enumerate()
            .map(|(idx, (option, _))| OptionTally {
                option,
                poll: poll.clone(),
                share: shares.get(idx).map(|&h| format_hundredths(h)),
            })
            .collect()
    }
}

/// Per-option results for a poll's vote rows. An empty slice gives an empty
/// result.
pub fn tally(votes: &[Vote], include_share: bool) -> Vec<OptionTally> {
    Tally::from_votes(votes).into_results(include_share)
}

/// Renders a percentage with at most two fractional digits and a trailing
/// `%`, dropping trailing zeros: `25%`, `23.08%`, `0%`. Ties round to even.
pub fn format_share(percentage: f64) -> String {
    format_hundredths((percentage * 100.0).round_ties_even().max(0.0) as u64)
}

fn format_hundredths(hundredths: u64) -> String {
    let (whole, frac) = (hundredths / 100, hundredths % 100);
    match frac {
        0 => format!("{}%", whole),
        f if f % 10 == 0 => format!("{}.{}%", whole, f / 10),
        f => format!("{}.{:02}%", whole, f),
    }
}
