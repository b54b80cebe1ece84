// Privacy (encryption) key records

use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::Element;
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::{Config, EncryptionKey, KeyMaterial};
use tracing::debug;

/// Basic privacy key: 2 bytes, all 0xff when unused
#[derive(Debug)]
pub struct BasicKeyElement<B>(Element<B>);

impl<B: AsRef<[u8]>> BasicKeyElement<B> {
    pub const SIZE: usize = 0x02;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_filled(0x00, Self::SIZE, 0xff)
    }

    pub fn key(&self) -> [u8; 2] {
        [self.0.u8(0), self.0.u8(1)]
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> BasicKeyElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
    }

    pub fn set_key(&mut self, key: &[u8; 2]) {
        self.0.bytes_mut(0x00, Self::SIZE).copy_from_slice(key);
    }
}

/// Enhanced (AES) privacy key: 16 bytes, all 0xff when unused
#[derive(Debug)]
pub struct EnhancedKeyElement<B>(Element<B>);

impl<B: AsRef<[u8]>> EnhancedKeyElement<B> {
    pub const SIZE: usize = 0x10;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_filled(0x00, Self::SIZE, 0xff)
    }

    pub fn key(&self) -> [u8; 16] {
        let mut key = [0u8; 16];
        key.copy_from_slice(self.0.bytes(0x00, Self::SIZE));
        key
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> EnhancedKeyElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0xff);
    }

    pub fn set_key(&mut self, key: &[u8; 16]) {
        self.0.bytes_mut(0x00, Self::SIZE).copy_from_slice(key);
    }
}

impl Codeplug {
    pub fn clear_privacy_keys(&mut self) -> CodeplugResult<()> {
        let basic = self.layout.basic_keys;
        for i in 0..basic.count {
            BasicKeyElement::new(self.table_record_mut(&basic, i)?)?.clear();
        }
        let enhanced = self.layout.enhanced_keys;
        for i in 0..enhanced.count {
            EnhancedKeyElement::new(self.table_record_mut(&enhanced, i)?)?.clear();
        }
        Ok(())
    }

    /// Basic keys and AES keys go to separate tables
    pub fn encode_privacy_keys(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_privacy_keys()?;
        let basic = self.layout.basic_keys;
        let enhanced = self.layout.enhanced_keys;

        for (handle, key) in config.encryption_keys.iter() {
            match &key.material {
                KeyMaterial::Dmr(bytes) => match ctx.basic_keys.index(handle) {
                    Some(index) => {
                        BasicKeyElement::new(self.table_record_mut(&basic, index as usize)?)?
                            .set_key(bytes);
                    }
                    None => ctx.log.warning(format!(
                        "basic key '{}' exceeds the limit of {} keys, skipped",
                        key.name, basic.count
                    )),
                },
                KeyMaterial::Aes(bytes) => match ctx.enhanced_keys.index(handle) {
                    Some(index) => {
                        EnhancedKeyElement::new(
                            self.table_record_mut(&enhanced, index as usize)?,
                        )?
                        .set_key(bytes);
                    }
                    None => ctx.log.warning(format!(
                        "enhanced key '{}' exceeds the limit of {} keys, skipped",
                        key.name, enhanced.count
                    )),
                },
            }
        }
        Ok(())
    }

    /// Key names are not stored on the device; decoded keys are numbered.
    /// All basic keys are created before the enhanced keys.
    pub fn create_privacy_keys(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let basic = self.layout.basic_keys;
        for i in 0..basic.count {
            let el = BasicKeyElement::new(self.table_record(&basic, i)?)?;
            if !el.is_valid() {
                continue;
            }
            let key = EncryptionKey::new(format!("Basic key {}", i + 1), KeyMaterial::Dmr(el.key()));
            let handle = config.encryption_keys.add(key);
            ctx.basic_keys.register(i as u32, handle);
        }

        let enhanced = self.layout.enhanced_keys;
        for i in 0..enhanced.count {
            let el = EnhancedKeyElement::new(self.table_record(&enhanced, i)?)?;
            if !el.is_valid() {
                continue;
            }
            let key = EncryptionKey::new(
                format!("Enhanced key {}", i + 1),
                KeyMaterial::Aes(el.key()),
            );
            let handle = config.encryption_keys.add(key);
            ctx.enhanced_keys.register(i as u32, handle);
        }
        debug!(
            "Created {} basic and {} enhanced keys",
            ctx.basic_keys.len(),
            ctx.enhanced_keys.len()
        );
        Ok(())
    }
}
