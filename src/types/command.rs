/// Keyboard commands the extension declares to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Show or hide the overlay on the active tab.
    ToggleAddressbar,
}

impl HostCommand {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "toggle-addressbar" => Some(HostCommand::ToggleAddressbar),
            _ => None,
        }
    }
}
