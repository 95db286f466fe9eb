// src/view/plot.rs
use crate::models::{IntervalInfo, Variant};
use crate::view::{ViewStage, interval_summary, stage, variant_summary};

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".svg", ".jpg", ".jpeg", ".webp"];

/// Derives a display label from a plot URL: the token after the last
/// underscore, image extension stripped, uppercased. Server plot paths end
/// in `..._<output-type>.png`, so this usually recovers the output type.
/// Falls back to a positional `Plot N` label when nothing survives.
pub fn plot_label(url: &str, index: usize) -> String {
    let token = url.rsplit('_').next().unwrap_or(url);
    let mut token = token.to_string();
    for ext in IMAGE_EXTENSIONS {
        if token.to_lowercase().ends_with(ext) {
            token.truncate(token.len() - ext.len());
            break;
        }
    }
    if token.is_empty() {
        format!("Plot {}", index + 1)
    } else {
        token.to_uppercase()
    }
}

/// Text rendering of the plot results: region/variant summaries followed by
/// one card per returned plot URL.
pub struct PlotView<'a> {
    pub plot_urls: &'a [String],
    pub interval: Option<&'a IntervalInfo>,
    pub variant: Option<&'a Variant>,
    pub loading: bool,
}

impl<'a> PlotView<'a> {
    pub fn stage(&self) -> ViewStage {
        stage(self.loading, !self.plot_urls.is_empty())
    }

    /// Renders the view, resolving each plot path to a fetchable URL with
    /// the supplied function.
    pub fn render<F>(&self, resolve: F) -> String
    where
        F: Fn(&str) -> String,
    {
        match self.stage() {
            ViewStage::Loading => "Loading predictions...".to_string(),
            ViewStage::Empty => "Submit a prediction to see results".to_string(),
            ViewStage::Populated => {
                let mut lines = Vec::new();
                if let Some(info) = self.interval {
                    lines.push(interval_summary(info));
                }
                if let Some(v) = self.variant {
                    lines.push(variant_summary(v));
                }
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                for (i, url) in self.plot_urls.iter().enumerate() {
                    lines.push(format!("[{}] {}", plot_label(url, i), resolve(url)));
                }
                lines.join("\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chromosome;

    #[test]
    fn test_label_from_trailing_token() {
        assert_eq!(plot_label("/plots/ab12_interval_rna.png", 0), "RNA");
        assert_eq!(plot_label("/plots/ab12_dnase.svg", 0), "DNASE");
        assert_eq!(plot_label("/plots/ab12_atac.PNG", 0), "ATAC");
    }

    #[test]
    fn test_label_without_underscore_uses_whole_token() {
        assert_eq!(plot_label("cage.png", 3), "CAGE");
    }

    #[test]
    fn test_label_fallback_is_positional() {
        assert_eq!(plot_label("/plots/ab12_.png", 2), "Plot 3");
        assert_eq!(plot_label("", 0), "Plot 1");
    }

    #[test]
    fn test_loading_preempts_populated() {
        let urls = vec!["/plots/a_rna.png".to_string()];
        let view = PlotView {
            plot_urls: &urls,
            interval: None,
            variant: None,
            loading: true,
        };
        assert_eq!(view.stage(), ViewStage::Loading);
        assert_eq!(view.render(|p| p.to_string()), "Loading predictions...");
    }

    #[test]
    fn test_empty_prompt() {
        let view = PlotView {
            plot_urls: &[],
            interval: None,
            variant: None,
            loading: false,
        };
        assert_eq!(view.render(|p| p.to_string()), "Submit a prediction to see results");
    }

    #[test]
    fn test_populated_render() {
        let urls = vec![
            "/plots/ab_rna.png".to_string(),
            "/plots/ab_dnase.png".to_string(),
        ];
        let info = IntervalInfo {
            chromosome: Chromosome::Chr19,
            start: 40_991_281,
            end: 41_018_398,
            width: 27_117,
            sequence_length: "128KB".to_string(),
        };
        let v = Variant::new(Chromosome::Chr22, 36_201_698, "A", "C");
        let view = PlotView {
            plot_urls: &urls,
            interval: Some(&info),
            variant: Some(&v),
            loading: false,
        };
        let rendered = view.render(|p| format!("http://localhost:8000{}", p));
        assert!(rendered.contains("Region: chr19:40,991,281-41,018,398"));
        assert!(rendered.contains("Variant: chr22:36201698 A>C"));
        assert!(rendered.contains("[RNA] http://localhost:8000/plots/ab_rna.png"));
        assert!(rendered.contains("[DNASE] http://localhost:8000/plots/ab_dnase.png"));
    }
}
