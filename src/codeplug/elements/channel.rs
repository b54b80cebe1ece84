// Channel record

use super::NAME_CHARS;
use crate::bitwise::bcd::{self, decode_bcd, encode_bcd_into};
use crate::bitwise::elements::Result as ElementResult;
use crate::bitwise::{Element, Endianness};
use crate::codeplug::{Codeplug, CodeplugContext, CodeplugError, CodeplugResult, Flags};
use crate::config::{
    AnalogAdmit, AnalogChannel, Bandwidth, Channel, ChannelCommon, Config, DigitalAdmit,
    DigitalChannel, InCallCriteria, Power, RefFrequency, Signaling, TimeSlot, TurnOffFrequency,
    TyTChannelExtension,
};
use crate::core::MessageLog;
use tracing::debug;

const MODE_ANALOG: u8 = 1;
const MODE_DIGITAL: u8 = 2;

const BANDWIDTH_12_5: u8 = 0;
const BANDWIDTH_25: u8 = 2;

const PRIVACY_NONE: u8 = 0;
const PRIVACY_BASIC: u8 = 1;
const PRIVACY_ENHANCED: u8 = 2;

const SIGNALING_NONE: u16 = 0xffff;
const SIGNALING_DCS: u16 = 0x8000;
const SIGNALING_DCS_INVERTED: u16 = 0x4000;

/// Channel record (64 bytes)
///
/// Byte layout:
/// - 0x00: mode (bits 0-1, 1=analog 2=digital), bandwidth (bits 2-3, 0=12.5kHz
///   1=20kHz 2=25kHz), auto scan (bit 4), lone worker (bit 7)
/// - 0x01: talkaround (bit 0), rx only (bit 1), time slot (bits 2-3), color code (bits 4-7)
/// - 0x02: privacy key index +1 (bits 0-3), privacy type (bits 4-5), private call
///   confirm (bit 6), data call confirm (bit 7)
/// - 0x03: rx reference frequency (bits 0-1), emergency ACK (bit 3), hide PTT ID (bit 7)
/// - 0x04: tx reference frequency (bits 0-1), VOX (bit 4), admit criterion (bits 6-7)
/// - 0x05: in-call criterion (bits 4-5), turn-off frequency (bits 6-7)
/// - 0x06: tx contact (u16 LE, +1 index)
/// - 0x08: TOT in 15s steps (bits 0-5)
/// - 0x09: rekey delay, 0x0a: emergency system, 0x0b: scan list, 0x0c: group list,
///   0x0d: GPS system (all +1 indices), 0x0e: DTMF decode bits, 0x0f: squelch
/// - 0x10/0x14: rx/tx frequency (8 digit LE BCD, 10Hz units)
/// - 0x18/0x1a: rx/tx signaling (u16 LE)
/// - 0x1c/0x1d: rx/tx signaling system
/// - 0x1e: power (bits 0-1, 0=low 1=mid 2=high)
/// - 0x1f: tx GPS (bit 0), rx GPS (bit 1), allow interrupt (bit 2), DCDM (bit 3), leader (bit 4)
/// - 0x20: name (16 x UTF-16LE)
#[derive(Debug)]
pub struct ChannelElement<B>(Element<B>);

impl<B: AsRef<[u8]>> ChannelElement<B> {
    pub const SIZE: usize = 0x40;

    pub fn new(data: B) -> ElementResult<Self> {
        Ok(Self(Element::new(data, Self::SIZE)?))
    }

    /// A slot is in use if its rx frequency is neither erased nor zero
    pub fn is_valid(&self) -> bool {
        !self.0.is_filled(0x10, 4, 0xff) && !self.0.is_filled(0x10, 4, 0x00)
    }

    pub fn mode(&self) -> u8 {
        self.0.uint(0x00, 0, 2)
    }

    pub fn bandwidth(&self) -> Bandwidth {
        match self.0.uint(0x00, 2, 2) {
            BANDWIDTH_12_5 => Bandwidth::Narrow,
            _ => Bandwidth::Wide,
        }
    }

    pub fn auto_scan(&self) -> bool {
        self.0.bit(0x00, 4)
    }

    pub fn lone_worker(&self) -> bool {
        self.0.bit(0x00, 7)
    }

    pub fn talkaround(&self) -> bool {
        self.0.bit(0x01, 0)
    }

    pub fn rx_only(&self) -> bool {
        self.0.bit(0x01, 1)
    }

    pub fn time_slot(&self) -> TimeSlot {
        match self.0.uint(0x01, 2, 2) {
            2 => TimeSlot::TS2,
            _ => TimeSlot::TS1,
        }
    }

    pub fn color_code(&self) -> u8 {
        self.0.uint(0x01, 4, 4)
    }

    /// (privacy type, stored key index +1)
    pub fn privacy(&self) -> (u8, u8) {
        (self.0.uint(0x02, 4, 2), self.0.uint(0x02, 0, 4))
    }

    pub fn private_call_confirm(&self) -> bool {
        self.0.bit(0x02, 6)
    }

    pub fn data_call_confirm(&self) -> bool {
        self.0.bit(0x02, 7)
    }

    pub fn rx_ref_frequency(&self) -> RefFrequency {
        ref_frequency(self.0.uint(0x03, 0, 2))
    }

    pub fn emergency_alarm_ack(&self) -> bool {
        self.0.bit(0x03, 3)
    }

    pub fn display_ptt_id(&self) -> bool {
        !self.0.bit(0x03, 7)
    }

    pub fn tx_ref_frequency(&self) -> RefFrequency {
        ref_frequency(self.0.uint(0x04, 0, 2))
    }

    pub fn vox(&self) -> bool {
        self.0.bit(0x04, 4)
    }

    pub fn admit_code(&self) -> u8 {
        self.0.uint(0x04, 6, 2)
    }

    pub fn in_call_criteria(&self) -> InCallCriteria {
        match self.0.uint(0x05, 4, 2) {
            1 => InCallCriteria::FollowAdmitCriteria,
            2 => InCallCriteria::TxInterrupt,
            _ => InCallCriteria::Always,
        }
    }

    pub fn turn_off_frequency(&self) -> TurnOffFrequency {
        match self.0.uint(0x05, 6, 2) {
            0 => TurnOffFrequency::Hz259_2,
            1 => TurnOffFrequency::Hz55_2,
            _ => TurnOffFrequency::Off,
        }
    }

    pub fn contact_index(&self) -> u16 {
        self.0.u16(0x06, Endianness::Little)
    }

    pub fn timeout_s(&self) -> u32 {
        self.0.uint(0x08, 0, 6) as u32 * 15
    }

    pub fn rekey_delay(&self) -> u8 {
        self.0.u8(0x09)
    }

    pub fn emergency_system_index(&self) -> u8 {
        self.0.u8(0x0a)
    }

    pub fn scan_list_index(&self) -> u8 {
        self.0.u8(0x0b)
    }

    pub fn group_list_index(&self) -> u8 {
        self.0.u8(0x0c)
    }

    pub fn gps_system_index(&self) -> u8 {
        self.0.u8(0x0d)
    }

    pub fn dtmf_decode(&self) -> u8 {
        self.0.u8(0x0e)
    }

    pub fn squelch(&self) -> u8 {
        self.0.u8(0x0f)
    }

    /// Receive frequency in Hz
    pub fn rx_frequency(&self) -> Option<u64> {
        self.0.bcd(0x10, 4, Endianness::Little).map(|f| f * 10)
    }

    /// Transmit frequency in Hz
    pub fn tx_frequency(&self) -> Option<u64> {
        self.0.bcd(0x14, 4, Endianness::Little).map(|f| f * 10)
    }

    pub fn rx_signaling(&self) -> Option<Signaling> {
        decode_signaling(self.0.u16(0x18, Endianness::Little))
    }

    pub fn tx_signaling(&self) -> Option<Signaling> {
        decode_signaling(self.0.u16(0x1a, Endianness::Little))
    }

    pub fn power(&self) -> Power {
        match self.0.uint(0x1e, 0, 2) {
            0 => Power::Low,
            1 => Power::Mid,
            _ => Power::High,
        }
    }

    pub fn tx_gps_info(&self) -> bool {
        self.0.bit(0x1f, 0)
    }

    pub fn rx_gps_info(&self) -> bool {
        self.0.bit(0x1f, 1)
    }

    pub fn allow_interrupt(&self) -> bool {
        self.0.bit(0x1f, 2)
    }

    pub fn dual_capacity_direct_mode(&self) -> bool {
        self.0.bit(0x1f, 3)
    }

    pub fn leader_or_ms(&self) -> bool {
        self.0.bit(0x1f, 4)
    }

    pub fn name(&self) -> String {
        self.0.utf16(0x20, NAME_CHARS)
    }

    /// Device specific settings carried in the channel extension
    pub fn extension(&self) -> TyTChannelExtension {
        TyTChannelExtension {
            lone_worker: self.lone_worker(),
            auto_scan: self.auto_scan(),
            talkaround: self.talkaround(),
            data_call_confirm: self.data_call_confirm(),
            private_call_confirm: self.private_call_confirm(),
            emergency_alarm_ack: self.emergency_alarm_ack(),
            display_ptt_id: self.display_ptt_id(),
            rx_ref_frequency: self.rx_ref_frequency(),
            tx_ref_frequency: self.tx_ref_frequency(),
            in_call_criteria: self.in_call_criteria(),
            turn_off_frequency: self.turn_off_frequency(),
            rekey_delay: self.rekey_delay(),
            allow_interrupt: self.allow_interrupt(),
            dual_capacity_direct_mode: self.dual_capacity_direct_mode(),
            leader_or_ms: self.leader_or_ms(),
            tx_gps_info: self.tx_gps_info(),
            rx_gps_info: self.rx_gps_info(),
            dtmf_decode: self.dtmf_decode(),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ChannelElement<B> {
    /// Reset to an unused analog channel
    pub fn clear(&mut self) {
        self.0.fill(0x00, Self::SIZE, 0x00);
        self.set_mode(MODE_ANALOG);
        self.set_time_slot(TimeSlot::TS1);
        self.set_color_code(1);
        self.set_turn_off_frequency(TurnOffFrequency::Off);
        self.set_squelch(1);
        self.0.fill(0x10, 8, 0xff);
        self.0.set_u16(0x18, SIGNALING_NONE, Endianness::Little);
        self.0.set_u16(0x1a, SIGNALING_NONE, Endianness::Little);
        self.set_power(Power::High);
    }

    pub fn set_mode(&mut self, mode: u8) {
        self.0.set_uint(0x00, 0, 2, mode);
    }

    pub fn set_bandwidth(&mut self, bandwidth: Bandwidth) {
        let code = match bandwidth {
            Bandwidth::Narrow => BANDWIDTH_12_5,
            Bandwidth::Wide => BANDWIDTH_25,
        };
        self.0.set_uint(0x00, 2, 2, code);
    }

    pub fn set_auto_scan(&mut self, enable: bool) {
        self.0.set_bit(0x00, 4, enable);
    }

    pub fn set_lone_worker(&mut self, enable: bool) {
        self.0.set_bit(0x00, 7, enable);
    }

    pub fn set_talkaround(&mut self, enable: bool) {
        self.0.set_bit(0x01, 0, enable);
    }

    pub fn set_rx_only(&mut self, enable: bool) {
        self.0.set_bit(0x01, 1, enable);
    }

    pub fn set_time_slot(&mut self, ts: TimeSlot) {
        let code = match ts {
            TimeSlot::TS1 => 1,
            TimeSlot::TS2 => 2,
        };
        self.0.set_uint(0x01, 2, 2, code);
    }

    pub fn set_color_code(&mut self, cc: u8) {
        self.0.set_uint(0x01, 4, 4, cc.min(15));
    }

    pub fn set_privacy(&mut self, kind: u8, index: u8) {
        self.0.set_uint(0x02, 4, 2, kind);
        self.0.set_uint(0x02, 0, 4, index);
    }

    pub fn set_private_call_confirm(&mut self, enable: bool) {
        self.0.set_bit(0x02, 6, enable);
    }

    pub fn set_data_call_confirm(&mut self, enable: bool) {
        self.0.set_bit(0x02, 7, enable);
    }

    pub fn set_rx_ref_frequency(&mut self, f: RefFrequency) {
        self.0.set_uint(0x03, 0, 2, ref_frequency_code(f));
    }

    pub fn set_emergency_alarm_ack(&mut self, enable: bool) {
        self.0.set_bit(0x03, 3, enable);
    }

    pub fn set_display_ptt_id(&mut self, enable: bool) {
        self.0.set_bit(0x03, 7, !enable);
    }

    pub fn set_tx_ref_frequency(&mut self, f: RefFrequency) {
        self.0.set_uint(0x04, 0, 2, ref_frequency_code(f));
    }

    pub fn set_vox(&mut self, enable: bool) {
        self.0.set_bit(0x04, 4, enable);
    }

    pub fn set_admit_code(&mut self, code: u8) {
        self.0.set_uint(0x04, 6, 2, code);
    }

    pub fn set_in_call_criteria(&mut self, criteria: InCallCriteria) {
        let code = match criteria {
            InCallCriteria::Always => 0,
            InCallCriteria::FollowAdmitCriteria => 1,
            InCallCriteria::TxInterrupt => 2,
        };
        self.0.set_uint(0x05, 4, 2, code);
    }

    pub fn set_turn_off_frequency(&mut self, f: TurnOffFrequency) {
        let code = match f {
            TurnOffFrequency::Hz259_2 => 0,
            TurnOffFrequency::Hz55_2 => 1,
            TurnOffFrequency::Off => 3,
        };
        self.0.set_uint(0x05, 6, 2, code);
    }

    pub fn set_contact_index(&mut self, index: u16) {
        self.0.set_u16(0x06, index, Endianness::Little);
    }

    /// Timeout in seconds, rounded down to 15s steps
    pub fn set_timeout_s(&mut self, seconds: u32) {
        self.0.set_uint(0x08, 0, 6, (seconds / 15).min(63) as u8);
    }

    pub fn set_rekey_delay(&mut self, delay: u8) {
        self.0.set_u8(0x09, delay);
    }

    pub fn set_emergency_system_index(&mut self, index: u8) {
        self.0.set_u8(0x0a, index);
    }

    pub fn set_scan_list_index(&mut self, index: u8) {
        self.0.set_u8(0x0b, index);
    }

    pub fn set_group_list_index(&mut self, index: u8) {
        self.0.set_u8(0x0c, index);
    }

    pub fn set_gps_system_index(&mut self, index: u8) {
        self.0.set_u8(0x0d, index);
    }

    pub fn set_dtmf_decode(&mut self, bits: u8) {
        self.0.set_u8(0x0e, bits);
    }

    pub fn set_squelch(&mut self, level: u8) {
        self.0.set_u8(0x0f, level);
    }

    pub fn set_rx_frequency(&mut self, hz: u64) -> bcd::Result<()> {
        self.0.set_bcd(0x10, 4, hz / 10, Endianness::Little)
    }

    pub fn set_tx_frequency(&mut self, hz: u64) -> bcd::Result<()> {
        self.0.set_bcd(0x14, 4, hz / 10, Endianness::Little)
    }

    pub fn set_rx_signaling(&mut self, code: u16) {
        self.0.set_u16(0x18, code, Endianness::Little);
    }

    pub fn set_tx_signaling(&mut self, code: u16) {
        self.0.set_u16(0x1a, code, Endianness::Little);
    }

    pub fn set_power(&mut self, power: Power) {
        let code = match power {
            Power::Min | Power::Low => 0,
            Power::Mid => 1,
            Power::High | Power::Max => 2,
        };
        self.0.set_uint(0x1e, 0, 2, code);
    }

    pub fn set_tx_gps_info(&mut self, enable: bool) {
        self.0.set_bit(0x1f, 0, enable);
    }

    pub fn set_rx_gps_info(&mut self, enable: bool) {
        self.0.set_bit(0x1f, 1, enable);
    }

    pub fn set_name(&mut self, name: &str) {
        self.0.set_utf16(0x20, NAME_CHARS, name, 0x0000);
    }

    pub fn set_extension(&mut self, ext: &TyTChannelExtension) {
        self.set_lone_worker(ext.lone_worker);
        self.set_auto_scan(ext.auto_scan);
        self.set_talkaround(ext.talkaround);
        self.set_data_call_confirm(ext.data_call_confirm);
        self.set_private_call_confirm(ext.private_call_confirm);
        self.set_emergency_alarm_ack(ext.emergency_alarm_ack);
        self.set_display_ptt_id(ext.display_ptt_id);
        self.set_rx_ref_frequency(ext.rx_ref_frequency);
        self.set_tx_ref_frequency(ext.tx_ref_frequency);
        self.set_in_call_criteria(ext.in_call_criteria);
        self.set_turn_off_frequency(ext.turn_off_frequency);
        self.set_rekey_delay(ext.rekey_delay);
        self.0.set_bit(0x1f, 2, ext.allow_interrupt);
        self.0.set_bit(0x1f, 3, ext.dual_capacity_direct_mode);
        self.0.set_bit(0x1f, 4, ext.leader_or_ms);
        self.set_tx_gps_info(ext.tx_gps_info);
        self.set_rx_gps_info(ext.rx_gps_info);
        self.set_dtmf_decode(ext.dtmf_decode);
    }
}

// Value 3 has no known meaning and reads as the low setting
fn ref_frequency(code: u8) -> RefFrequency {
    match code {
        1 => RefFrequency::Medium,
        2 => RefFrequency::High,
        _ => RefFrequency::Low,
    }
}

fn ref_frequency_code(f: RefFrequency) -> u8 {
    match f {
        RefFrequency::Low => 0,
        RefFrequency::Medium => 1,
        RefFrequency::High => 2,
    }
}

fn bcd_u16(value: u64) -> bcd::Result<u16> {
    let mut bytes = [0u8; 2];
    encode_bcd_into(value, &mut bytes, Endianness::Big)?;
    Ok(u16::from_be_bytes(bytes))
}

/// Decode a signaling word: 0xffff none, bit 15 DCS (bit 14 inverted, octal code
/// as BCD), otherwise CTCSS in BCD tenths of a Hz
pub fn decode_signaling(code: u16) -> Option<Signaling> {
    if code == SIGNALING_NONE {
        return Some(Signaling::None);
    }
    if code & SIGNALING_DCS != 0 {
        let digits = decode_bcd(&(code & 0x0fff).to_be_bytes(), Endianness::Big).ok()?;
        return Some(Signaling::Dcs {
            code: digits as u16,
            inverted: code & SIGNALING_DCS_INVERTED != 0,
        });
    }
    decode_bcd(&code.to_be_bytes(), Endianness::Big)
        .ok()
        .map(|tenths| Signaling::Ctcss(tenths as u16))
}

pub fn encode_signaling(signaling: Signaling) -> CodeplugResult<u16> {
    match signaling {
        Signaling::None => Ok(SIGNALING_NONE),
        Signaling::Ctcss(tenths) => Ok(bcd_u16(tenths as u64)?),
        Signaling::Dcs { code, inverted } => {
            if code > 777 {
                return Err(CodeplugError::InvalidValue(format!(
                    "DCS code {} out of range",
                    code
                )));
            }
            if code.to_string().contains(['8', '9']) {
                return Err(CodeplugError::InvalidValue(format!(
                    "DCS code {} is not octal",
                    code
                )));
            }
            let mut word = SIGNALING_DCS | bcd_u16(code as u64)?;
            if inverted {
                word |= SIGNALING_DCS_INVERTED;
            }
            Ok(word)
        }
    }
}

fn signaling_or_none(signaling: Signaling, log: &mut MessageLog) -> u16 {
    match encode_signaling(signaling) {
        Ok(code) => code,
        Err(err) => {
            log.warning(format!("{}, signaling disabled", err));
            SIGNALING_NONE
        }
    }
}

fn encode_channel<B: AsRef<[u8]> + AsMut<[u8]>>(
    el: &mut ChannelElement<B>,
    channel: &Channel,
    config: &Config,
    flags: &Flags,
    ctx: &mut CodeplugContext,
) -> CodeplugResult<()> {
    let common = channel.common();
    el.set_name(&common.name);
    for hz in [common.rx_frequency, common.tx_frequency] {
        if hz % 10 != 0 {
            ctx.log
                .hint(format!("frequency {} Hz rounded down to a 10 Hz step", hz));
        }
    }
    el.set_rx_frequency(common.rx_frequency)?;
    el.set_tx_frequency(common.tx_frequency)?;
    el.set_power(common.power);
    el.set_timeout_s(common.timeout_s);
    el.set_rx_only(common.rx_only);
    el.set_vox(common.vox);
    el.set_extension(&common.tyt);
    let scan_list = ctx
        .scan_lists
        .encode(common.scan_list, "scan list", &mut ctx.log)?;
    el.set_scan_list_index(scan_list as u8);

    match channel {
        Channel::Analog(ch) => {
            el.set_mode(MODE_ANALOG);
            el.set_admit_code(match ch.admit {
                AnalogAdmit::Always => 0,
                AnalogAdmit::ChannelFree => 1,
                AnalogAdmit::Tone => 2,
            });
            el.set_bandwidth(ch.bandwidth);
            el.set_squelch(ch.squelch);
            el.set_rx_signaling(signaling_or_none(ch.rx_tone, &mut ctx.log));
            el.set_tx_signaling(signaling_or_none(ch.tx_tone, &mut ctx.log));
        }
        Channel::Digital(ch) => {
            el.set_mode(MODE_DIGITAL);
            el.set_admit_code(match ch.admit {
                DigitalAdmit::Always => 0,
                DigitalAdmit::ChannelFree => 1,
                DigitalAdmit::ColorCode => 3,
            });
            el.set_bandwidth(Bandwidth::Narrow);
            el.set_color_code(ch.color_code);
            el.set_time_slot(ch.time_slot);

            let contact = ctx.contacts.encode(ch.tx_contact, "contact", &mut ctx.log)?;
            el.set_contact_index(contact as u16);
            let group_list = ctx
                .group_lists
                .encode(ch.group_list, "group list", &mut ctx.log)?;
            el.set_group_list_index(group_list as u8);
            let gps = ctx
                .gps_systems
                .encode(ch.gps_system, "GPS system", &mut ctx.log)?;
            el.set_gps_system_index(gps as u8);
            let emergency = ctx.emergency_systems.encode(
                ch.emergency_system,
                "emergency system",
                &mut ctx.log,
            )?;
            el.set_emergency_system_index(emergency as u8);

            if flags.auto_enable_gps && gps != 0 {
                el.set_tx_gps_info(true);
                el.set_rx_gps_info(true);
            }

            if let Some(key) = ch.encryption_key {
                if let Some(index) = ctx.basic_keys.index(key) {
                    el.set_privacy(PRIVACY_BASIC, index as u8 + 1);
                } else if let Some(index) = ctx.enhanced_keys.index(key) {
                    el.set_privacy(PRIVACY_ENHANCED, index as u8 + 1);
                } else if config.encryption_keys.contains(key) {
                    ctx.log
                        .warning(format!("encryption key {:?} is not encoded, privacy disabled", key));
                } else {
                    ctx.log
                        .critical(format!("dangling reference to encryption key {:?}", key));
                    return Err(CodeplugError::UnresolvedReference {
                        kind: "encryption key",
                        stack: ctx.log.path(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn decode_channel<B: AsRef<[u8]>>(
    el: &ChannelElement<B>,
    log: &mut MessageLog,
) -> Option<Channel> {
    let Some(rx_frequency) = el.rx_frequency() else {
        log.warning("invalid rx frequency, channel skipped");
        return None;
    };
    let tx_frequency = el.tx_frequency().unwrap_or_else(|| {
        log.warning("invalid tx frequency, using rx frequency");
        rx_frequency
    });

    let mut common = ChannelCommon::new(el.name(), rx_frequency, tx_frequency);
    common.power = el.power();
    common.timeout_s = el.timeout_s();
    common.rx_only = el.rx_only();
    common.vox = el.vox();
    common.tyt = el.extension();

    match el.mode() {
        MODE_ANALOG => {
            let mut ch = AnalogChannel::new("", 0, 0);
            ch.common = common;
            ch.admit = match el.admit_code() {
                1 => AnalogAdmit::ChannelFree,
                2 => AnalogAdmit::Tone,
                _ => AnalogAdmit::Always,
            };
            ch.bandwidth = el.bandwidth();
            ch.squelch = el.squelch();
            ch.rx_tone = el.rx_signaling().unwrap_or_else(|| {
                log.warning("invalid rx signaling, disabled");
                Signaling::None
            });
            ch.tx_tone = el.tx_signaling().unwrap_or_else(|| {
                log.warning("invalid tx signaling, disabled");
                Signaling::None
            });
            Some(Channel::Analog(ch))
        }
        MODE_DIGITAL => {
            let mut ch = DigitalChannel::new("", 0, 0);
            ch.common = common;
            ch.admit = match el.admit_code() {
                1 => DigitalAdmit::ChannelFree,
                3 => DigitalAdmit::ColorCode,
                _ => DigitalAdmit::Always,
            };
            ch.color_code = el.color_code();
            ch.time_slot = el.time_slot();
            Some(Channel::Digital(ch))
        }
        mode => {
            log.warning(format!("unknown channel mode {}, channel skipped", mode));
            None
        }
    }
}

impl Codeplug {
    pub fn clear_channels(&mut self) -> CodeplugResult<()> {
        let table = self.layout.channels;
        for i in 0..table.count {
            ChannelElement::new(self.table_record_mut(&table, i)?)?.clear();
        }
        Ok(())
    }

    /// Encode all channels; more channels than the device holds is fatal
    pub fn encode_channels(
        &mut self,
        config: &Config,
        flags: &Flags,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        self.clear_channels()?;
        let table = self.layout.channels;
        if config.channels.len() > table.count {
            ctx.log.critical(format!(
                "{} channels exceed the limit of {}",
                config.channels.len(),
                table.count
            ));
            return Err(CodeplugError::Capacity {
                kind: "channels",
                count: config.channels.len(),
                max: table.count,
                stack: ctx.log.path(),
            });
        }

        for (handle, channel) in config.channels.iter() {
            let Some(index) = ctx.channels.index(handle) else {
                continue;
            };
            ctx.log.push(format!("channel {}", index + 1));
            let mut el = ChannelElement::new(self.table_record_mut(&table, index as usize)?)?;
            encode_channel(&mut el, channel, config, flags, ctx)?;
            ctx.log.pop();
        }
        Ok(())
    }

    pub fn create_channels(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.channels;
        for i in 0..table.count {
            let el = ChannelElement::new(self.table_record(&table, i)?)?;
            if !el.is_valid() {
                continue;
            }
            ctx.log.push(format!("channel {}", i + 1));
            if let Some(channel) = decode_channel(&el, &mut ctx.log) {
                let handle = config.channels.add(channel);
                ctx.channels.register(i as u32, handle);
            }
            ctx.log.pop();
        }
        debug!("Created {} channels", ctx.channels.len());
        Ok(())
    }

    pub fn link_channels(
        &self,
        config: &mut Config,
        ctx: &mut CodeplugContext,
    ) -> CodeplugResult<()> {
        let table = self.layout.channels;
        for i in 0..table.count {
            let Some(handle) = ctx.channels.handle(i as u32) else {
                continue;
            };
            let el = ChannelElement::new(self.table_record(&table, i)?)?;
            ctx.log.push(format!("channel {}", i + 1));
            let Some(channel) = config.channels.get_mut(handle) else {
                ctx.log.pop();
                continue;
            };

            channel.common_mut().scan_list =
                ctx.scan_lists
                    .resolve(el.scan_list_index() as u32, "scan list", &mut ctx.log);

            if let Channel::Digital(ch) = channel {
                ch.tx_contact =
                    ctx.contacts
                        .resolve(el.contact_index() as u32, "contact", &mut ctx.log);
                ch.group_list = ctx.group_lists.resolve(
                    el.group_list_index() as u32,
                    "group list",
                    &mut ctx.log,
                );
                ch.gps_system = ctx.gps_systems.resolve(
                    el.gps_system_index() as u32,
                    "GPS system",
                    &mut ctx.log,
                );
                ch.emergency_system = ctx.emergency_systems.resolve(
                    el.emergency_system_index() as u32,
                    "emergency system",
                    &mut ctx.log,
                );
                ch.encryption_key = match el.privacy() {
                    (PRIVACY_NONE, _) => None,
                    (_, 0) => None,
                    (kind, index) => {
                        let key = match kind {
                            PRIVACY_BASIC => ctx.basic_keys.handle(index as u32 - 1),
                            PRIVACY_ENHANCED => ctx.enhanced_keys.handle(index as u32 - 1),
                            _ => None,
                        };
                        if key.is_none() {
                            ctx.log.warning(format!(
                                "cannot resolve privacy key {} of type {}",
                                index, kind
                            ));
                        }
                        key
                    }
                };
            }
            ctx.log.pop();
        }
        Ok(())
    }
}
