use indicatif::ProgressStyle;

pub(crate) fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:>12} [{wide_bar:.green/dim}] {pos}/{len} rows ({eta} left)")
        .unwrap()
        .progress_chars("##-")
}
