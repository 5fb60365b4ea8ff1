#![allow(unsafe_code)] // dladdr requires unsafe

use crate::domain::Address;

/// What the symbol table knows about an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Path of the module containing the address (may be empty)
    pub module: String,
    /// Nearest preceding exported symbol, if the table has one
    pub name: Option<String>,
    /// Start of that symbol, or [`Address::NULL`] when unknown
    pub start: Address,
}

impl SymbolInfo {
    /// Signed distance from the symbol start to `addr`
    #[must_use]
    pub fn offset_of(&self, addr: Address) -> isize {
        addr.offset_from(self.start)
    }
}

/// Attribute an address to a loaded module and symbol
///
/// Returns `None` when no loaded module covers the address.
pub trait Resolve {
    fn resolve(&self, addr: Address) -> Option<SymbolInfo>;
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self, addr: Address) -> Option<SymbolInfo> {
        (**self).resolve(addr)
    }
}

/// Resolver backed by the dynamic loader's symbol tables (`dladdr`)
///
/// Only symbols in a module's dynamic symbol table are visible, so frames in
/// a non-exported function are attributed to the nearest exported one or to
/// the module alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicLoader;

impl Resolve for DynamicLoader {
    fn resolve(&self, addr: Address) -> Option<SymbolInfo> {
        platform::dladdr(addr)
    }
}

#[cfg(unix)]
mod platform {
    use super::SymbolInfo;
    use crate::domain::Address;
    use std::ffi::{c_void, CStr};

    pub fn dladdr(addr: Address) -> Option<SymbolInfo> {
        let mut info = std::mem::MaybeUninit::<libc::Dl_info>::zeroed();
        let ok = unsafe { libc::dladdr(addr.get() as *const c_void, info.as_mut_ptr()) };
        if ok == 0 {
            return None;
        }

        let info = unsafe { info.assume_init() };
        let module = if info.dli_fname.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(info.dli_fname) }.to_string_lossy().into_owned()
        };
        let name = if info.dli_sname.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(info.dli_sname) }.to_string_lossy().into_owned())
        };

        Some(SymbolInfo { module, name, start: Address(info.dli_saddr as usize) })
    }
}

#[cfg(not(unix))]
mod platform {
    use super::SymbolInfo;
    use crate::domain::Address;

    pub fn dladdr(_addr: Address) -> Option<SymbolInfo> {
        None
    }
}
