// Preset text message record

use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugResult, Flags};
use crate::config::Config;

use super::name_unset;

/// Preset text message: 144 x UTF-16LE, 0-padded
#[derive(Debug)]
pub struct TextMessageElement<B>(Element<B>);

impl<B: AsRef<[u8]>> TextMessageElement<B> {
    pub const SIZE: usize = 0x120;
    pub const CHARS: usize = 144;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    pub fn is_valid(&self) -> bool {
        !name_unset(self.0.u16(0x00, Endianness::Little))
    }

    pub fn message(&self) -> String {
        self.0.utf16(0x00, Self::CHARS)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> TextMessageElement<B> {
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0x00);
    }

    pub fn set_message(&mut self, text: &str) {
        self.0.set_utf16(0x00, Self::CHARS, text, 0x0000);
    }
}

impl Codeplug {
    pub fn clear_text_messages(&mut self) -> CodeplugResult<()> {
        let table = self.layout.text_messages;
        for i in 0..table.count {
            TextMessageElement::new(self.table_record_mut(&table, i)?)?.clear();
        }
        Ok(())
    }

    pub fn encode_text_messages(
        &mut self,
        config: &Config,
        _flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_text_messages()?;
        let table = self.layout.text_messages;
        let chars = TextMessageElement::<&[u8]>::CHARS;
        if config.text_messages.len() > table.count {
            ctx.log.warning(format!(
                "{} text messages exceed the limit of {}, truncated",
                config.text_messages.len(),
                table.count
            ));
        }

        for (i, text) in config.text_messages.iter().take(table.count).enumerate() {
            if text.chars().count() > chars {
                ctx.log.push(format!("text message {}", i + 1));
                ctx.log
                    .hint(format!("message longer than {} characters, truncated", chars));
                ctx.log.pop();
            }
            TextMessageElement::new(self.table_record_mut(&table, i)?)?.set_message(text);
        }
        Ok(())
    }

    /// Empty slots are skipped, so message positions are not preserved
    pub fn decode_text_messages(
        &self,
        config: &mut Config,
        _ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.text_messages;
        config.text_messages.clear();
        for i in 0..table.count {
            let el = TextMessageElement::new(self.table_record(&table, i)?)?;
            if el.is_valid() {
                config.text_messages.push(el.message());
            }
        }
        Ok(())
    }
}
