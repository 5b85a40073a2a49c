//! The EWMH side of the tool: property queries, pager-style client
//! messages and the root-window PropertyNotify subscription, all on top of
//! a single blocking x11rb connection.

use x11rb::{
    connection::Connection,
    protocol::{
        Event,
        xproto::{
            Atom, AtomEnum, ChangeWindowAttributesAux, ClientMessageEvent, ConnectionExt,
            EventMask, Window,
        },
    },
    rust_connection::RustConnection,
};

use focus_last_core::constants::{FILTER_NORMAL_WINDOWS, SCREEN_NUM};

use crate::prelude::*;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        _NET_ACTIVE_WINDOW,
        _NET_CURRENT_DESKTOP,
        _NET_WM_DESKTOP,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_NORMAL,
    }
}

/// Source indication in EWMH client messages: 2 marks the request as
/// coming from a pager or similar direct user action.
const SOURCE_PAGER: u32 = 2;

pub struct Ewmh {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
}

impl Ewmh {
    pub fn connect() -> Result<Self> {
        let (conn, _) = x11rb::connect(None)?;
        let root = conn.setup().roots[SCREEN_NUM].root;
        let atoms = Atoms::new(&conn)?.reply()?;
        Ok(Self { conn, root, atoms })
    }

    /// The window currently holding focus, 0 when the property is unset.
    pub fn active_window(&self) -> Result<Window> {
        self.property_u32(self.root, self.atoms._NET_ACTIVE_WINDOW, AtomEnum::WINDOW)
    }

    pub fn current_desktop(&self) -> Result<u32> {
        self.property_u32(self.root, self.atoms._NET_CURRENT_DESKTOP, AtomEnum::CARDINAL)
    }

    pub fn window_desktop(&self, window: Window) -> Result<u32> {
        self.property_u32(window, self.atoms._NET_WM_DESKTOP, AtomEnum::CARDINAL)
    }

    /// Whether _NET_WM_WINDOW_TYPE lists the window as a normal
    /// application window. Windows without the property (tooltips, docks,
    /// override-redirect popups) do not qualify.
    pub fn is_normal_window(&self, window: Window) -> Result<bool> {
        if !FILTER_NORMAL_WINDOWS {
            return Ok(true);
        }
        let reply = self
            .conn
            .get_property(false, window, self.atoms._NET_WM_WINDOW_TYPE, AtomEnum::ATOM, 0, 32)?
            .reply()?;
        let Some(mut types) = reply.value32() else {
            return Ok(false);
        };
        Ok(types.any(|atom| atom == self.atoms._NET_WM_WINDOW_TYPE_NORMAL))
    }

    pub fn switch_desktop(&self, desktop: u32) -> Result<()> {
        self.send_pager_message(
            self.root,
            self.atoms._NET_CURRENT_DESKTOP,
            [desktop, x11rb::CURRENT_TIME, 0, 0, 0],
        )
    }

    pub fn activate(&self, window: Window) -> Result<()> {
        self.send_pager_message(
            window,
            self.atoms._NET_ACTIVE_WINDOW,
            [SOURCE_PAGER, x11rb::CURRENT_TIME, 0, 0, 0],
        )
    }

    /// Asks for PropertyNotify events on the root window, where the window
    /// manager publishes _NET_ACTIVE_WINDOW.
    pub fn watch_root_properties(&self) -> Result<()> {
        let attrs = ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE);
        self.conn.change_window_attributes(self.root, &attrs)?;
        self.conn.flush()?;
        Ok(())
    }

    /// Blocks until the active-window property changes. Other events on
    /// the connection are drained and ignored.
    pub fn wait_for_active_window_change(&self) -> Result<()> {
        loop {
            if let Event::PropertyNotify(notify) = self.conn.wait_for_event()? {
                if notify.atom == self.atoms._NET_ACTIVE_WINDOW {
                    return Ok(());
                }
            }
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }

    fn property_u32(&self, window: Window, property: Atom, kind: AtomEnum) -> Result<u32> {
        let reply = self.conn.get_property(false, window, property, kind, 0, 1)?.reply()?;
        Ok(reply.value32().and_then(|mut values| values.next()).unwrap_or(0))
    }

    fn send_pager_message(&self, window: Window, message_type: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, message_type, data);
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
            event,
        )?;
        Ok(())
    }
}
