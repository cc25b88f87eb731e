//! Windows registrar: GDI font resources, the Fonts registry key, and
//! the WM_FONTCHANGE broadcast.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;
use windows::core::HSTRING;
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::AddFontResourceW;
use windows::Win32::System::Registry::{
    RegCloseKey, RegOpenKeyExW, RegSetValueExW, HKEY, HKEY_LOCAL_MACHINE, KEY_SET_VALUE, REG_SZ,
};
use windows::Win32::UI::WindowsAndMessaging::{
    SendMessageTimeoutW, SendMessageW, HWND_BROADCAST, SMTO_ABORTIFHUNG, WM_FONTCHANGE,
};

use crate::core::settings::FONT_CHANGE_BROADCAST_TIMEOUT_MS;

/// Registry key Windows reads at boot to re-register installed fonts.
const FONTS_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Fonts";

pub struct WindowsRegistrar {
    font_dir: PathBuf,
}

impl WindowsRegistrar {
    pub fn new() -> Self {
        let windir = std::env::var_os("WINDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
        Self {
            font_dir: windir.join("Fonts"),
        }
    }
}

impl Default for WindowsRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

impl super::FontRegistrar for WindowsRegistrar {
    fn font_dir(&self) -> PathBuf {
        self.font_dir.clone()
    }

    fn load_font_resource(&self, path: &Path) -> Result<bool> {
        let wide = HSTRING::from(path.as_os_str());
        // Returns the number of fonts added; zero means rejection.
        let added = unsafe { AddFontResourceW(&wide) };
        Ok(added > 0)
    }

    fn write_durable_record(&self, record_name: &str, file_name: &str) -> Result<()> {
        let mut key = HKEY::default();
        unsafe {
            RegOpenKeyExW(
                HKEY_LOCAL_MACHINE,
                &HSTRING::from(FONTS_KEY),
                Some(0),
                KEY_SET_VALUE,
                &mut key,
            )
        }
        .ok()
        .context("failed to open the Fonts registry key")?;

        // REG_SZ data is UTF-16 including the terminator, passed as bytes.
        let wide: Vec<u16> = file_name.encode_utf16().chain(std::iter::once(0)).collect();
        let data =
            unsafe { std::slice::from_raw_parts(wide.as_ptr().cast::<u8>(), wide.len() * 2) };
        let result = unsafe {
            RegSetValueExW(key, &HSTRING::from(record_name), Some(0), REG_SZ, Some(data))
        };
        let _ = unsafe { RegCloseKey(key) };
        if result.is_err() {
            bail!("failed to write Fonts registry value for {record_name}");
        }
        Ok(())
    }

    fn broadcast_font_change(&self) {
        // Bounded broadcast first; a hung window must not stall the
        // install loop. Fall back to the plain send if the bounded call
        // reports failure.
        let mut response: usize = 0;
        let result = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_FONTCHANGE,
                WPARAM(0),
                LPARAM(0),
                SMTO_ABORTIFHUNG,
                FONT_CHANGE_BROADCAST_TIMEOUT_MS,
                Some(&mut response),
            )
        };
        if result == LRESULT(0) {
            debug!("bounded font-change broadcast failed; sending unbounded");
            unsafe {
                SendMessageW(HWND_BROADCAST, WM_FONTCHANGE, None, None);
            }
        }
    }
}
