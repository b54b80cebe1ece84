// Index <-> object mapping threaded through one encode or decode run
//
// Decode registers every created object under its table position (create
// phase) and resolves stored indices against those registrations (link
// phase). Encode registers every object that gets a device record before any
// record is written, so references can be turned into indices in one pass.

use super::error::{CodeplugError, CodeplugResult};
use super::layout::DeviceLayout;
use crate::config::{
    Channel, ChannelRef, Config, Contact, EmergencySystem, EncryptionKey, GpsSystem, Handle,
    KeyMaterial, RxGroupList, ScanList, Zone,
};
use crate::core::MessageLog;
use std::collections::{HashMap, HashSet};

/// Bidirectional map between table positions (0-based) and handles
#[derive(Debug)]
pub struct IndexTable<T> {
    by_index: HashMap<u32, Handle<T>>,
    by_handle: HashMap<Handle<T>, u32>,
    skipped: HashSet<Handle<T>>,
}

impl<T> Default for IndexTable<T> {
    fn default() -> Self {
        Self {
            by_index: HashMap::new(),
            by_handle: HashMap::new(),
            skipped: HashSet::new(),
        }
    }
}

impl<T> IndexTable<T> {
    pub fn register(&mut self, index: u32, handle: Handle<T>) {
        self.by_index.insert(index, handle);
        self.by_handle.insert(handle, index);
    }

    /// Mark an object that exists in the configuration but gets no device record
    pub fn skip(&mut self, handle: Handle<T>) {
        self.skipped.insert(handle);
    }

    pub fn handle(&self, index: u32) -> Option<Handle<T>> {
        self.by_index.get(&index).copied()
    }

    pub fn index(&self, handle: Handle<T>) -> Option<u32> {
        self.by_handle.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Resolve a stored +1 index; 0 is "none", unknown indices are reported and dropped
    pub fn resolve(&self, stored: u32, kind: &str, log: &mut MessageLog) -> Option<Handle<T>> {
        if stored == 0 {
            return None;
        }
        let handle = self.handle(stored - 1);
        if handle.is_none() {
            log.warning(format!("cannot resolve {} index {}", kind, stored));
        }
        handle
    }

    /// 0-based table position of `handle`.
    ///
    /// Objects that were skipped (capacity, unsupported kind) yield `None` with a
    /// warning; objects unknown to the configuration are a fatal error.
    pub fn position(
        &self,
        handle: Handle<T>,
        kind: &'static str,
        log: &mut MessageLog,
    ) -> CodeplugResult<Option<u32>> {
        if let Some(index) = self.index(handle) {
            return Ok(Some(index));
        }
        if self.skipped.contains(&handle) {
            log.warning(format!("{} {:?} is not encoded, reference dropped", kind, handle));
            return Ok(None);
        }
        log.critical(format!("dangling reference to {} {:?}", kind, handle));
        Err(CodeplugError::UnresolvedReference {
            kind,
            stack: log.path(),
        })
    }

    /// Encode an optional reference as a +1 index
    pub fn encode(
        &self,
        handle: Option<Handle<T>>,
        kind: &'static str,
        log: &mut MessageLog,
    ) -> CodeplugResult<u32> {
        match handle {
            None => Ok(0),
            Some(h) => Ok(self.position(h, kind, log)?.map_or(0, |i| i + 1)),
        }
    }
}

#[derive(Debug, Default)]
pub struct CodeplugContext {
    pub contacts: IndexTable<Contact>,
    pub group_lists: IndexTable<RxGroupList>,
    pub channels: IndexTable<Channel>,
    pub zones: IndexTable<Zone>,
    pub scan_lists: IndexTable<ScanList>,
    pub gps_systems: IndexTable<GpsSystem>,
    pub emergency_systems: IndexTable<EmergencySystem>,
    pub basic_keys: IndexTable<EncryptionKey>,
    pub enhanced_keys: IndexTable<EncryptionKey>,
    pub log: MessageLog,
}

fn register_list<T>(
    table: &mut IndexTable<T>,
    handles: impl Iterator<Item = Handle<T>>,
    capacity: usize,
) {
    for (i, handle) in handles.enumerate() {
        if i < capacity {
            table.register(i as u32, handle);
        } else {
            table.skip(handle);
        }
    }
}

impl CodeplugContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign table positions to every object of `config` for `layout`
    pub fn for_encode(config: &Config, layout: &DeviceLayout) -> Self {
        let mut ctx = Self::new();

        let mut digital = 0usize;
        for (handle, contact) in config.contacts.iter() {
            match contact {
                Contact::Digital(_) if digital < layout.contacts.count => {
                    ctx.contacts.register(digital as u32, handle);
                    digital += 1;
                }
                _ => ctx.contacts.skip(handle),
            }
        }

        register_list(
            &mut ctx.group_lists,
            config.group_lists.iter().map(|(h, _)| h),
            layout.group_lists.count,
        );
        register_list(
            &mut ctx.channels,
            config.channels.iter().map(|(h, _)| h),
            layout.channels.count,
        );
        register_list(
            &mut ctx.zones,
            config.zones.iter().map(|(h, _)| h),
            layout.zones.count,
        );
        register_list(
            &mut ctx.scan_lists,
            config.scan_lists.iter().map(|(h, _)| h),
            layout.scan_lists.count,
        );
        register_list(
            &mut ctx.gps_systems,
            config.gps_systems.iter().map(|(h, _)| h),
            layout.gps_systems.map_or(0, |t| t.count),
        );
        register_list(
            &mut ctx.emergency_systems,
            config.emergency_systems.iter().map(|(h, _)| h),
            layout.emergency_systems.count,
        );
        register_list(
            &mut ctx.basic_keys,
            config
                .encryption_keys
                .iter()
                .filter(|(_, k)| matches!(k.material, KeyMaterial::Dmr(_)))
                .map(|(h, _)| h),
            layout.basic_keys.count,
        );
        register_list(
            &mut ctx.enhanced_keys,
            config
                .encryption_keys
                .iter()
                .filter(|(_, k)| matches!(k.material, KeyMaterial::Aes(_)))
                .map(|(h, _)| h),
            layout.enhanced_keys.count,
        );

        ctx
    }

    /// Decode a channel reference where 0 is "selected" and `none_code`, if the
    /// encoding has one, is "none"
    pub fn resolve_channel_ref(&mut self, stored: u16, none_code: Option<u16>) -> ChannelRef {
        if Some(stored) == none_code {
            return ChannelRef::None;
        }
        if stored == 0 {
            return ChannelRef::Selected;
        }
        match self
            .channels
            .resolve(stored as u32, "channel", &mut self.log)
        {
            Some(handle) => ChannelRef::Channel(handle),
            None => ChannelRef::None,
        }
    }

    /// Inverse of `resolve_channel_ref`. Encodings without a "none" code store
    /// `ChannelRef::None` as "selected".
    pub fn encode_channel_ref(
        &mut self,
        reference: ChannelRef,
        none_code: Option<u16>,
    ) -> CodeplugResult<u16> {
        match reference {
            ChannelRef::None => match none_code {
                Some(code) => Ok(code),
                None => {
                    self.log
                        .hint("no channel reference possible here, using the selected channel");
                    Ok(0)
                }
            },
            ChannelRef::Selected => Ok(0),
            ChannelRef::Channel(handle) => {
                match self.channels.position(handle, "channel", &mut self.log)? {
                    Some(index) => Ok(index as u16 + 1),
                    None => Ok(none_code.unwrap_or(0)),
                }
            }
        }
    }
}
