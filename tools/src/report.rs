//! Plain-text summaries of a scaled architecture.

use std::fmt::Write;

use efficientnet::scaling::{STEM_KERNEL, STEM_STRIDE};
use efficientnet::{EfficientNetConfig, ScaledArchitecture, INPUT_CHANNELS};

/// Head is a single pointwise convolution.
const HEAD_KERNEL: usize = 1;
const HEAD_STRIDE: usize = 1;

/// Per-stage table plus the totals `describe` prints.
pub fn architecture_report(
    label: &str,
    cfg: &EfficientNetConfig,
    arch: &ScaledArchitecture,
    num_params: Option<usize>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{label}: width {:.2} depth {:.2} resolution {} dropout {:.2} se_ratio {:.2}",
        cfg.width_coef,
        cfg.depth_coef,
        cfg.input_resolution(),
        cfg.dropout,
        cfg.se_ratio
    );
    let _ = writeln!(
        out,
        "{:<6} {:>6} {:>6} {:>7} {:>6} {:>6} {:>6}",
        "stage", "in", "out", "repeats", "kernel", "stride", "expand"
    );
    let _ = writeln!(
        out,
        "{:<6} {:>6} {:>6} {:>7} {:>6} {:>6} {:>6}",
        "stem",
        INPUT_CHANNELS,
        arch.stem_channels,
        1,
        STEM_KERNEL,
        STEM_STRIDE,
        "-"
    );
    for (i, s) in arch.stages.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<6} {:>6} {:>6} {:>7} {:>6} {:>6} {:>6}",
            i + 1,
            s.in_channels,
            s.out_channels,
            s.repeats,
            s.kernel_size,
            s.stride,
            s.expand
        );
    }
    let last = arch.stages.last().map_or(arch.stem_channels, |s| s.out_channels);
    let _ = writeln!(
        out,
        "{:<6} {:>6} {:>6} {:>7} {:>6} {:>6} {:>6}",
        "head",
        last,
        arch.head_channels,
        1,
        HEAD_KERNEL,
        HEAD_STRIDE,
        "-"
    );
    let _ = write!(
        out,
        "blocks {} classes {}",
        arch.total_blocks(),
        cfg.num_classes
    );
    if let Some(n) = num_params {
        let _ = write!(out, " params {n}");
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use efficientnet::Variant;

    #[test]
    fn b0_report_lists_every_stage() {
        let cfg = Variant::B0.config(1000);
        let arch = cfg.architecture().unwrap();
        let report = architecture_report("efficientnet-b0", &cfg, &arch, Some(42));
        let lines: Vec<&str> = report.lines().collect();
        // summary, header, stem, 7 stages, head, totals
        assert_eq!(lines.len(), 12);
        assert!(lines[0].contains("resolution 224"));
        assert!(lines[3].split_whitespace().eq(["1", "32", "16", "1", "3", "1", "1"]));
        assert!(lines[10].split_whitespace().eq(["head", "320", "1280", "1", "1", "1", "-"]));
        assert!(lines[2].split_whitespace().eq([
            "stem".to_string(),
            INPUT_CHANNELS.to_string(),
            "32".to_string(),
            "1".to_string(),
            STEM_KERNEL.to_string(),
            STEM_STRIDE.to_string(),
            "-".to_string(),
        ]));
        assert_eq!(lines[11], "blocks 16 classes 1000 params 42");
    }
}
