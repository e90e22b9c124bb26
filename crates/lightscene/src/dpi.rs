/// DPI a monitor reports at 100% scaling.
pub const DEFAULT_DPI: f32 = 96.0;

/// Scale factor relative to a 96 DPI display. A DPI of zero (no monitor
/// information) is treated as unscaled.
pub fn dpi_scale(dpi: u32) -> f32 {
    if dpi == 0 {
        return 1.0;
    }
    dpi as f32 / DEFAULT_DPI
}

/// DPI equivalent of a windowing-system scale factor such as winit's.
pub fn effective_dpi(scale_factor: f64) -> u32 {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return DEFAULT_DPI as u32;
    }
    (scale_factor * f64::from(DEFAULT_DPI)).round() as u32
}
