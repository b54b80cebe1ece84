// Block-wise transfer of memory images between host and radio

use super::interface::RadioInterface;
use super::TransportResult;
use crate::callsigndb::CallsignDb;
use crate::codeplug::{Codeplug, DeviceLayout};
use crate::memmap::MemoryImage;
use std::sync::Arc;
use tracing::{debug, info};

/// Progress callback type
/// Arguments: (bytes_transferred, total_bytes, status_message)
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

pub const DEFAULT_BLOCK_SIZE: usize = 0x400;

/// Splits every image element into blocks and moves them in ascending
/// address order, image by image (image index = bank)
#[derive(Debug, Clone, Copy)]
pub struct BlockTransfer {
    block_size: usize,
}

impl Default for BlockTransfer {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl BlockTransfer {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Total number of bytes of all images
    pub fn total_size(images: &[MemoryImage]) -> usize {
        images.iter().map(|image| image.total_size()).sum()
    }

    /// Number of blocks needed for all images
    pub fn num_blocks(&self, images: &[MemoryImage]) -> usize {
        images
            .iter()
            .flat_map(|image| image.elements())
            .map(|el| el.size().div_ceil(self.block_size))
            .sum()
    }

    /// Download into the already allocated elements of `images`
    pub fn download(
        &self,
        iface: &mut dyn RadioInterface,
        images: &mut [MemoryImage],
        progress: Option<ProgressCallback>,
    ) -> TransportResult<()> {
        let total = Self::total_size(images);
        let num_blocks = self.num_blocks(images);
        info!("Downloading {} bytes from {}", total, iface.identifier());

        iface.start()?;
        let mut done = 0;
        let mut block = 0;
        for (bank, image) in images.iter_mut().enumerate() {
            image.sort();
            for n in 0..image.num_elements() {
                let Some(element) = image.element_mut(n) else {
                    continue;
                };
                let base = element.address();
                debug!("Reading element 0x{:08x} ({} bytes)", base, element.size());
                for (i, chunk) in element.data_mut().chunks_mut(self.block_size).enumerate() {
                    let address = base + (i * self.block_size) as u32;
                    iface.read(bank as u32, address, chunk)?;
                    done += chunk.len();
                    block += 1;
                    if let Some(ref callback) = progress {
                        let msg = format!("Read block {}/{}", block, num_blocks);
                        callback(done, total, &msg);
                    }
                }
            }
        }
        iface.finish()?;
        Ok(())
    }

    /// Upload all elements of `images`
    pub fn upload(
        &self,
        iface: &mut dyn RadioInterface,
        images: &[MemoryImage],
        progress: Option<ProgressCallback>,
    ) -> TransportResult<()> {
        let total = Self::total_size(images);
        let num_blocks = self.num_blocks(images);
        info!("Uploading {} bytes to {}", total, iface.identifier());

        iface.start()?;
        let mut done = 0;
        let mut block = 0;
        for (bank, image) in images.iter().enumerate() {
            let mut elements: Vec<_> = image.elements().collect();
            elements.sort_by_key(|el| el.address());
            for element in elements {
                debug!(
                    "Writing element 0x{:08x} ({} bytes)",
                    element.address(),
                    element.size()
                );
                for (i, chunk) in element.data().chunks(self.block_size).enumerate() {
                    let address = element.address() + (i * self.block_size) as u32;
                    iface.write(bank as u32, address, chunk)?;
                    done += chunk.len();
                    block += 1;
                    if let Some(ref callback) = progress {
                        let msg = format!("Wrote block {}/{}", block, num_blocks);
                        callback(done, total, &msg);
                    }
                }
            }
        }
        iface.finish()?;
        Ok(())
    }
}

/// Download a complete codeplug of the device described by `layout`
pub fn download_codeplug(
    iface: &mut dyn RadioInterface,
    layout: &'static DeviceLayout,
    transfer: &BlockTransfer,
    progress: Option<ProgressCallback>,
) -> TransportResult<Codeplug> {
    let mut codeplug = Codeplug::new(layout);
    codeplug.clear()?;
    let mut images = codeplug.into_images();
    transfer.download(iface, &mut images, progress)?;
    Ok(Codeplug::from_images(layout, images)?)
}

pub fn upload_codeplug(
    iface: &mut dyn RadioInterface,
    codeplug: &Codeplug,
    transfer: &BlockTransfer,
    progress: Option<ProgressCallback>,
) -> TransportResult<()> {
    transfer.upload(iface, codeplug.images(), progress)
}

/// Upload an encoded callsign database, always to bank 0
pub fn upload_callsign_db(
    iface: &mut dyn RadioInterface,
    db: &CallsignDb,
    transfer: &BlockTransfer,
    progress: Option<ProgressCallback>,
) -> TransportResult<()> {
    transfer.upload(iface, std::slice::from_ref(db.image()), progress)
}

/// Run `download_codeplug` on a blocking worker thread.
/// The interface is handed back together with the codeplug.
pub async fn download_in_background<I>(
    mut iface: I,
    layout: &'static DeviceLayout,
    progress: Option<ProgressCallback>,
) -> TransportResult<(I, Codeplug)>
where
    I: RadioInterface + 'static,
{
    tokio::task::spawn_blocking(move || {
        let codeplug = download_codeplug(&mut iface, layout, &BlockTransfer::default(), progress)?;
        Ok((iface, codeplug))
    })
    .await?
}

/// Run `upload_codeplug` on a blocking worker thread
pub async fn upload_in_background<I>(
    mut iface: I,
    codeplug: Codeplug,
    progress: Option<ProgressCallback>,
) -> TransportResult<I>
where
    I: RadioInterface + 'static,
{
    tokio::task::spawn_blocking(move || {
        upload_codeplug(&mut iface, &codeplug, &BlockTransfer::default(), progress)?;
        Ok(iface)
    })
    .await?
}
