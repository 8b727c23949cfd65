//! Scroll-position tracking for section headers.

use crate::ConfigTable;

/// Precomputed document offsets for each section header, derived from the
/// row heights in table order.
#[derive(Debug, Clone, Default)]
pub struct ScrollSpy {
    headers: Vec<SectionHeader>,
}

#[derive(Debug, Clone)]
struct SectionHeader {
    section: usize,
    top: f32,
    height: f32,
}

impl ScrollSpy {
    pub fn new(table: &ConfigTable) -> Self {
        let mut offsets = vec![0.0f32; table.rows.len()];
        let mut y = 0.0f32;
        for (idx, row) in table.rows.iter().enumerate() {
            offsets[idx] = y;
            y += row.height;
        }

        let headers = table
            .sections
            .iter()
            .enumerate()
            .map(|(section, s)| match s.header_row {
                Some(row) => SectionHeader {
                    section,
                    top: offsets[row],
                    height: table.rows[row].height,
                },
                // The implicit General section starts at the top of the
                // document and has no header of its own.
                None => SectionHeader {
                    section,
                    top: 0.0,
                    height: 0.0,
                },
            })
            .collect();

        Self { headers }
    }

    /// The section to mark active for a given scroll position.
    ///
    /// A header counts as crossed once its top sits at or above the
    /// viewport's effective top plus 75% of the header height; the last
    /// crossed header wins. Before any header is crossed the first section
    /// is active.
    pub fn active_section(&self, scroll_top: f32, effective_top: f32) -> Option<usize> {
        let mut active = self.headers.first().map(|h| h.section);
        for header in &self.headers {
            let viewport_pos = header.top - scroll_top;
            if viewport_pos <= effective_top + 0.75 * header.height {
                active = Some(header.section);
            }
        }
        active
    }
}
