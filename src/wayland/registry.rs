//! The global capability registry (`wl_registry`).
//!
//! Right after `get_registry` the server announces every global it offers,
//! one `global` event each.  A round trip afterwards guarantees the burst
//! is complete, which is how absence of a capability is detected.
//!
//! The state type's `Dispatch<WlRegistry, ()>` impl is the global handler;
//! it turns events into [`Global`]s with [`Global::from_event`] and binds
//! the ones it wants with [`bind`].

use log::{debug, warn};
use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::{Dispatch, Proxy, QueueHandle};

/// One advertised global.  Only meaningful while it is being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    /// Server-side numeric name used for binding.
    pub name: u32,
    /// Interface name, e.g. `"next_control_v1"`.
    pub interface: String,
    /// Highest version the server implements.
    pub version: u32,
}

impl Global {
    /// The announced global, or `None` for `global_remove`.
    pub fn from_event(event: wl_registry::Event) -> Option<Self> {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => Some(Self {
                name,
                interface,
                version,
            }),
            _ => None,
        }
    }

    /// Whether this global is an instance of `I`.
    pub fn is<I: Proxy>(&self) -> bool {
        self.interface == I::interface().name
    }
}

/// Errors from [`bind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("cannot bind {found} as {expected}")]
    InterfaceMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("invalid version {version} for {interface}")]
    InvalidVersion { interface: String, version: u32 },
}

/// Version to bind `global` at as an `I`.
///
/// The advertised version is used unless it is newer than the generated
/// bindings support.
pub fn bind_version<I: Proxy>(global: &Global) -> Result<u32, BindError> {
    let supported = I::interface();
    if global.interface != supported.name {
        return Err(BindError::InterfaceMismatch {
            expected: supported.name,
            found: global.interface.clone(),
        });
    }
    if global.version == 0 {
        return Err(BindError::InvalidVersion {
            interface: global.interface.clone(),
            version: global.version,
        });
    }
    if global.version > supported.version {
        warn!(
            "{} v{} is newer than the supported v{}",
            global.interface, global.version, supported.version
        );
    }
    Ok(global.version.min(supported.version))
}

/// Bind `global` as an `I` whose events go to `D`.
///
/// Binding under an interface `I` does not implement fails without
/// touching the socket.
pub fn bind<I, D>(registry: &WlRegistry, global: &Global, qh: &QueueHandle<D>) -> Result<I, BindError>
where
    I: Proxy + 'static,
    D: Dispatch<I, ()> + 'static,
{
    let version = bind_version::<I>(global)?;
    let proxy: I = registry.bind(global.name, version, qh, ());
    debug!(
        "bound global {} ({} v{}) as {}",
        global.name,
        global.interface,
        version,
        proxy.id()
    );
    Ok(proxy)
}
