//! Color theme constants.

use ratatui::style::Color;

/// Primary border color
pub const COLOR_BORDER: Color = Color::DarkGray;

/// Focused borders and labels
pub const COLOR_ACCENT: Color = Color::White;

/// Dim text for less important info
pub const COLOR_DIM: Color = Color::DarkGray;

// ============================================================================
// Log Categories
// ============================================================================

/// Connect entries
pub const COLOR_CONNECT: Color = Color::Rgb(4, 181, 117); // green #04B575

/// Disconnect and error entries
pub const COLOR_FAILURE: Color = Color::Rgb(220, 80, 80);

/// Inbound and outbound traffic
pub const COLOR_TRAFFIC: Color = Color::Gray;

// ============================================================================
// Session State Indicator
// ============================================================================

pub const COLOR_STATE_CONNECTED: Color = Color::LightGreen;
pub const COLOR_STATE_PENDING: Color = Color::Yellow;
pub const COLOR_STATE_IDLE: Color = Color::Gray;
pub const COLOR_STATE_ERROR: Color = Color::Red;
