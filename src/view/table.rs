// src/view/table.rs
use crate::models::{Variant, VariantScore};
use crate::view::{ViewStage, stage, variant_summary};

pub const PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    GeneName,
    QuantileScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

pub fn format_quantile(score: f64) -> String {
    format!("{:.4}", score)
}

pub fn format_raw(score: f64) -> String {
    format!("{:.6}", score)
}

/// The stringified cells a row presents, in column order: gene, quantile
/// score, raw score, tissue, type. The global filter matches against these.
fn visible_cells(row: &VariantScore) -> [String; 5] {
    [
        row.gene_name.clone(),
        format_quantile(row.quantile_score),
        format_raw(row.raw_score),
        row.biosample_name.clone(),
        row.output_type.clone(),
    ]
}

/// Sortable, filterable, paginated view over a returned score set.
/// Pagination is computed after filtering and sorting; page navigation
/// clamps at the boundaries instead of wrapping.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    rows: Vec<VariantScore>,
    filter: String,
    sort: Option<(SortKey, SortDir)>,
    page: usize,
}

impl ScoreTable {
    pub fn new(rows: Vec<VariantScore>) -> Self {
        Self {
            rows,
            filter: String::new(),
            sort: None,
            page: 0,
        }
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
        self.clamp_page();
    }

    /// Sorting the same column again flips direction; a new column starts
    /// ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = match self.sort {
            Some((k, SortDir::Asc)) if k == key => Some((key, SortDir::Desc)),
            Some((k, SortDir::Desc)) if k == key => Some((key, SortDir::Asc)),
            _ => Some((key, SortDir::Asc)),
        };
    }

    pub fn set_sort(&mut self, key: SortKey, dir: SortDir) {
        self.sort = Some((key, dir));
    }

    fn filtered(&self) -> Vec<&VariantScore> {
        if self.filter.is_empty() {
            return self.rows.iter().collect();
        }
        let needle = self.filter.to_lowercase();
        self.rows
            .iter()
            .filter(|row| {
                visible_cells(row)
                    .iter()
                    .any(|cell| cell.to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn ordered(&self) -> Vec<&VariantScore> {
        let mut rows = self.filtered();
        if let Some((key, dir)) = self.sort {
            rows.sort_by(|a, b| {
                let ord = match key {
                    SortKey::GeneName => a
                        .gene_name
                        .to_lowercase()
                        .cmp(&b.gene_name.to_lowercase()),
                    SortKey::QuantileScore => a.quantile_score.total_cmp(&b.quantile_score),
                };
                match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            });
        }
        rows
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered().len()
    }

    pub fn page_count(&self) -> usize {
        self.filtered_len().div_ceil(PAGE_SIZE)
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
        self.clamp_page();
    }

    fn clamp_page(&mut self) {
        let last = self.page_count().saturating_sub(1);
        if self.page > last {
            self.page = last;
        }
    }

    pub fn can_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn can_prev(&self) -> bool {
        self.page > 0
    }

    /// Advances one page; a no-op at the last page.
    pub fn next_page(&mut self) {
        if self.can_next() {
            self.page += 1;
        }
    }

    /// Goes back one page; a no-op at the first page.
    pub fn prev_page(&mut self) {
        if self.can_prev() {
            self.page -= 1;
        }
    }

    /// Rows on the current page, after filter and sort.
    pub fn page_rows(&self) -> Vec<&VariantScore> {
        self.ordered()
            .into_iter()
            .skip(self.page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect()
    }

    /// One-based `(from, to, total)` for the footer, or `None` when nothing
    /// matches.
    pub fn showing_range(&self) -> Option<(usize, usize, usize)> {
        let total = self.filtered_len();
        if total == 0 {
            return None;
        }
        let from = self.page * PAGE_SIZE + 1;
        let to = ((self.page + 1) * PAGE_SIZE).min(total);
        Some((from, to, total))
    }

    pub fn render(&self, variant: Option<&Variant>, loading: bool) -> String {
        match stage(loading, !self.rows.is_empty()) {
            ViewStage::Loading => "Loading scores...".to_string(),
            ViewStage::Empty => "Submit a variant to see scores".to_string(),
            ViewStage::Populated => {
                let mut lines = Vec::new();
                if let Some(v) = variant {
                    lines.push(variant_summary(v));
                    lines.push(String::new());
                }
                lines.push(format!(
                    "{:<16} {:>14} {:>12} {:<24} {:<18}",
                    "Gene", "Quantile Score", "Raw Score", "Tissue", "Type"
                ));
                let rows = self.page_rows();
                if rows.is_empty() {
                    lines.push("No results.".to_string());
                } else {
                    for row in rows {
                        lines.push(format!(
                            "{:<16} {:>14} {:>12} {:<24} {:<18}",
                            row.gene_name,
                            format_quantile(row.quantile_score),
                            format_raw(row.raw_score),
                            row.biosample_name,
                            row.output_type
                        ));
                    }
                }
                if let Some((from, to, total)) = self.showing_range() {
                    lines.push(String::new());
                    lines.push(format!("Showing {} to {} of {} results", from, to, total));
                }
                lines.join("\n")
            }
        }
    }

    pub fn stage(&self, loading: bool) -> ViewStage {
        stage(loading, !self.rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(gene: &str, quantile: f64, raw: f64, tissue: &str, output: &str) -> VariantScore {
        VariantScore {
            gene_name: gene.to_string(),
            gene_id: String::new(),
            strand: "+".to_string(),
            ontology_term: String::new(),
            biosample_name: tissue.to_string(),
            raw_score: raw,
            quantile_score: quantile,
            output_type: output.to_string(),
        }
    }

    fn sample_rows() -> Vec<VariantScore> {
        vec![
            row("APOL4", 0.9876, 0.000123456, "blood", "RNA_SEQ"),
            row("apol2", 0.1234, -0.0005, "brain", "DNASE"),
            row("MYH9", 0.5555, 0.25, "heart", "RNA_SEQ"),
        ]
    }

    #[test]
    fn test_filter_is_case_insensitive_across_columns() {
        let mut table = ScoreTable::new(sample_rows());

        table.set_filter("apol");
        assert_eq!(table.filtered_len(), 2);

        table.set_filter("HEART");
        assert_eq!(table.filtered_len(), 1);

        // matches the stringified output type column
        table.set_filter("rna_seq");
        assert_eq!(table.filtered_len(), 2);

        // matches a numeric cell at display precision
        table.set_filter("0.9876");
        assert_eq!(table.filtered_len(), 1);

        table.set_filter("zebrafish");
        assert_eq!(table.filtered_len(), 0);
    }

    #[test]
    fn test_sort_toggle_on_gene_and_quantile() {
        let mut table = ScoreTable::new(sample_rows());

        table.toggle_sort(SortKey::GeneName);
        let genes: Vec<&str> = table.page_rows().iter().map(|r| r.gene_name.as_str()).collect();
        assert_eq!(genes, vec!["apol2", "APOL4", "MYH9"]);

        table.toggle_sort(SortKey::GeneName);
        let genes: Vec<&str> = table.page_rows().iter().map(|r| r.gene_name.as_str()).collect();
        assert_eq!(genes, vec!["MYH9", "APOL4", "apol2"]);

        // switching column resets to ascending
        table.toggle_sort(SortKey::QuantileScore);
        let quantiles: Vec<f64> = table.page_rows().iter().map(|r| r.quantile_score).collect();
        assert_eq!(quantiles, vec![0.1234, 0.5555, 0.9876]);
    }

    #[test]
    fn test_sort_is_independent_of_arrival_order() {
        let mut reversed = sample_rows();
        reversed.reverse();
        let mut a = ScoreTable::new(sample_rows());
        let mut b = ScoreTable::new(reversed);
        a.set_sort(SortKey::QuantileScore, SortDir::Desc);
        b.set_sort(SortKey::QuantileScore, SortDir::Desc);
        let genes_a: Vec<&str> = a.page_rows().iter().map(|r| r.gene_name.as_str()).collect();
        let genes_b: Vec<&str> = b.page_rows().iter().map(|r| r.gene_name.as_str()).collect();
        assert_eq!(genes_a, genes_b);
    }

    #[test]
    fn test_pagination_limits_and_clamping() {
        let rows: Vec<VariantScore> = (0..45)
            .map(|i| row(&format!("GENE{:02}", i), i as f64 / 100.0, 0.0, "blood", "RNA_SEQ"))
            .collect();
        let mut table = ScoreTable::new(rows);

        assert_eq!(table.page_count(), 3);
        assert_eq!(table.page_rows().len(), 20);
        assert_eq!(table.showing_range(), Some((1, 20, 45)));
        assert!(!table.can_prev());

        table.next_page();
        assert_eq!(table.showing_range(), Some((21, 40, 45)));

        table.next_page();
        assert_eq!(table.page_rows().len(), 5);
        assert_eq!(table.showing_range(), Some((41, 45, 45)));
        assert!(!table.can_next());

        // past the last page is a no-op, not a wrap
        table.next_page();
        assert_eq!(table.page(), 2);

        table.prev_page();
        table.prev_page();
        table.prev_page();
        assert_eq!(table.page(), 0);
    }

    #[test]
    fn test_filter_shrink_clamps_current_page() {
        let rows: Vec<VariantScore> = (0..45)
            .map(|i| row(&format!("GENE{:02}", i), 0.5, 0.0, "blood", "RNA_SEQ"))
            .collect();
        let mut table = ScoreTable::new(rows);
        table.set_page(2);
        table.set_filter("GENE01");
        assert_eq!(table.page(), 0);
        assert_eq!(table.filtered_len(), 1);
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(format_quantile(0.98765432), "0.9877");
        assert_eq!(format_raw(0.000123456), "0.000123");
        assert_eq!(format_raw(-0.0005), "-0.000500");
    }

    #[test]
    fn test_render_states() {
        let table = ScoreTable::new(Vec::new());
        assert_eq!(table.stage(true), ViewStage::Loading);
        assert_eq!(table.stage(false), ViewStage::Empty);
        assert_eq!(table.render(None, true), "Loading scores...");
        assert_eq!(table.render(None, false), "Submit a variant to see scores");

        let mut table = ScoreTable::new(sample_rows());
        let rendered = table.render(None, false);
        assert!(rendered.contains("APOL4"));
        assert!(rendered.contains("0.9876"));
        assert!(rendered.contains("Showing 1 to 3 of 3 results"));

        table.set_filter("nothing-matches");
        let rendered = table.render(None, false);
        assert!(rendered.contains("No results."));
    }
}
