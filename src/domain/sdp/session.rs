//! Session-level part of a session description

use super::lines::*;
use crate::domain::shared::error::SdpError;

/// Everything before the first `m=` line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDescription {
    pub version: Option<VersionLine>,
    pub origin: Option<OriginLine>,
    pub session_name: Option<SessionNameLine>,
    pub information: Option<SessionInformationLine>,
    pub connection: Option<ConnectionLine>,
    pub bandwidth: Option<BandwidthLine>,
    pub timing: Option<TimingLine>,
    pub bundle_groups: Vec<BundleGroupLine>,
    /// Lines without a dedicated field, in arrival order
    pub other_lines: Vec<Line>,
}

impl SessionDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one line into the session block
    pub fn add_line(&mut self, line: Line) -> Result<(), SdpError> {
        match line {
            Line::Media(_) => return Err(SdpError::UnexpectedMediaLine),
            Line::Version(l) if self.version.is_none() => self.version = Some(l),
            Line::Origin(l) if self.origin.is_none() => self.origin = Some(l),
            Line::SessionName(l) if self.session_name.is_none() => self.session_name = Some(l),
            Line::SessionInformation(l) if self.information.is_none() => {
                self.information = Some(l)
            }
            Line::Connection(l) if self.connection.is_none() => self.connection = Some(l),
            Line::Bandwidth(l) if self.bandwidth.is_none() => self.bandwidth = Some(l),
            Line::Timing(l) if self.timing.is_none() => self.timing = Some(l),
            Line::BundleGroup(l) => self.bundle_groups.push(l),
            other => self.other_lines.push(other),
        }
        Ok(())
    }

    /// Lines in canonical output order
    pub fn to_lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();

        if let Some(ref l) = self.version {
            lines.push(Line::Version(l.clone()));
        }
        if let Some(ref l) = self.origin {
            lines.push(Line::Origin(l.clone()));
        }
        if let Some(ref l) = self.session_name {
            lines.push(Line::SessionName(l.clone()));
        }
        if let Some(ref l) = self.information {
            lines.push(Line::SessionInformation(l.clone()));
        }
        if let Some(ref l) = self.connection {
            lines.push(Line::Connection(l.clone()));
        }
        if let Some(ref l) = self.bandwidth {
            lines.push(Line::Bandwidth(l.clone()));
        }
        if let Some(ref l) = self.timing {
            lines.push(Line::Timing(l.clone()));
        }
        lines.extend(self.bundle_groups.iter().cloned().map(Line::BundleGroup));
        lines.extend(self.other_lines.iter().cloned());

        lines
    }
}
