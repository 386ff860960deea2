// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! `msi.dll` backend.
//!
//! Each native handle lives in a [`Handle`] that calls `MsiCloseHandle` when
//! dropped. Views additionally run `MsiViewClose` before their handle goes.

#![allow(unsafe_code)]

use std::ffi::OsStr;
use std::marker::PhantomData;
use std::os::windows::ffi::OsStrExt as _;
use std::path::{Path, PathBuf};

use tracing::debug;
use windows_sys::Win32::Foundation::{
    ERROR_MORE_DATA, ERROR_NO_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS,
};
use windows_sys::Win32::System::ApplicationInstallationAndServicing::{
    MSIHANDLE, MsiCloseHandle, MsiCreateTransformSummaryInfoW, MsiDatabaseCommit,
    MsiDatabaseGenerateTransformW, MsiDatabaseIsTablePersistentW, MsiDatabaseOpenViewW,
    MsiOpenDatabaseW, MsiRecordGetFieldCount, MsiRecordGetStringW, MsiRecordIsNull,
    MsiViewClose, MsiViewExecute, MsiViewFetch, MsiViewGetColumnInfo,
};

use crate::error::{Error, Result};
use crate::transform::TransformFlags;
use crate::types::{Column, OpenMode, Row, StreamFields, table_exists_from_condition};
use crate::{Database, Installer, View};

// MSICOLINFO
const COLINFO_NAMES: i32 = 0;
const COLINFO_TYPES: i32 = 1;

/// Owned `MSIHANDLE`.
#[derive(Debug)]
struct Handle(MSIHANDLE);

impl Handle {
    fn raw(&self) -> MSIHANDLE {
        self.0
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.0 != 0 {
            // SAFETY: the handle was returned by msi.dll and is owned solely
            // by this guard, so it is closed exactly once.
            unsafe { MsiCloseHandle(self.0) };
        }
    }
}

/// NUL-terminated UTF-16 copy of `s`.
fn wide(s: &OsStr) -> Result<Vec<u16>> {
    let mut buf: Vec<u16> = s.encode_wide().collect();
    if buf.contains(&0) {
        return Err(Error::InteriorNul(s.to_string_lossy().into_owned()));
    }
    buf.push(0);
    Ok(buf)
}

fn check(call: &'static str, code: u32) -> Result<()> {
    if code == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(Error::call(call, code))
    }
}

fn field_count(record: &Handle) -> u32 {
    // SAFETY: record is a live record handle.
    unsafe { MsiRecordGetFieldCount(record.raw()) }
}

fn is_null(record: &Handle, field: u32) -> bool {
    // SAFETY: record is a live record handle; out of range fields read as null.
    unsafe { MsiRecordIsNull(record.raw(), field) != 0 }
}

fn record_string(record: &Handle, field: u32) -> Result<String> {
    let mut buf = vec![0u16; 256];
    loop {
        let mut len = buf.len() as u32;
        // SAFETY: buf holds `len` writable u16 slots; on ERROR_MORE_DATA the
        // engine only writes the required length (without terminator) to len.
        let code =
            unsafe { MsiRecordGetStringW(record.raw(), field, buf.as_mut_ptr(), &mut len) };
        match code {
            ERROR_SUCCESS => return Ok(String::from_utf16_lossy(&buf[..len as usize])),
            ERROR_MORE_DATA => buf.resize(len as usize + 1, 0),
            code => return Err(Error::call("MsiRecordGetString", code)),
        }
    }
}

/// The Windows Installer engine in `msi.dll`.
#[derive(Debug, Default)]
pub struct WindowsInstaller {
    _private: (),
}

impl WindowsInstaller {
    pub fn new() -> Self {
        debug!("Acquired Windows Installer engine");
        Self { _private: () }
    }
}

impl Drop for WindowsInstaller {
    fn drop(&mut self) {
        debug!("Released Windows Installer engine");
    }
}

impl Installer for WindowsInstaller {
    type Database = WindowsDatabase;

    fn open_database(&self, path: &Path, mode: OpenMode) -> Result<WindowsDatabase> {
        let wide_path = wide(path.as_os_str())?;
        let mut raw: MSIHANDLE = 0;
        // SAFETY: wide_path is NUL-terminated. The persist argument is one of
        // the predefined integer modes (MSIDBOPEN_READONLY, MSIDBOPEN_TRANSACT)
        // that the engine accepts in place of a string pointer.
        let code = unsafe {
            MsiOpenDatabaseW(
                wide_path.as_ptr(),
                mode.persist() as *const u16,
                &mut raw,
            )
        };
        check("MsiOpenDatabase", code)?;

        debug!("Opened database at {} ({:?})", path.display(), mode);
        Ok(WindowsDatabase {
            handle: Handle(raw),
            path: path.to_owned(),
        })
    }
}

/// An open package.
#[derive(Debug)]
pub struct WindowsDatabase {
    handle: Handle,
    path: PathBuf,
}

impl Database for WindowsDatabase {
    type View<'db> = WindowsView<'db>;

    fn path(&self) -> &Path {
        &self.path
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let name = wide(OsStr::new(table))?;
        // SAFETY: handle is a live database handle and name is NUL-terminated.
        let condition = unsafe { MsiDatabaseIsTablePersistentW(self.handle.raw(), name.as_ptr()) };
        table_exists_from_condition(condition)
    }

    fn open_view(&self, query: &str) -> Result<WindowsView<'_>> {
        let wide_query = wide(OsStr::new(query))?;
        let mut raw: MSIHANDLE = 0;
        // SAFETY: handle is a live database handle and wide_query is
        // NUL-terminated.
        let code =
            unsafe { MsiDatabaseOpenViewW(self.handle.raw(), wide_query.as_ptr(), &mut raw) };
        check("MsiDatabaseOpenView", code)?;

        debug!("Opened view: {query}");
        Ok(WindowsView {
            handle: Handle(raw),
            streams: None,
            _database: PhantomData,
        })
    }

    fn commit(&mut self) -> Result<()> {
        // SAFETY: handle is a live database handle.
        let code = unsafe { MsiDatabaseCommit(self.handle.raw()) };
        check("MsiDatabaseCommit", code)?;
        debug!("Committed database at {}", self.path.display());
        Ok(())
    }

    fn generate_transform(&self, reference: &Self, output: &Path) -> Result<()> {
        let wide_output = wide(output.as_os_str())?;
        // SAFETY: both handles are live database handles and wide_output is
        // NUL-terminated. The two trailing arguments are reserved and must be 0.
        let code = unsafe {
            MsiDatabaseGenerateTransformW(
                self.handle.raw(),
                reference.handle.raw(),
                wide_output.as_ptr(),
                0,
                0,
            )
        };
        match code {
            ERROR_SUCCESS => {
                debug!("Generated transform at {}", output.display());
                Ok(())
            }
            ERROR_NO_DATA => Err(Error::NoChanges {
                updated: self.path.clone(),
                reference: reference.path.clone(),
            }),
            code => Err(Error::call("MsiDatabaseGenerateTransform", code)),
        }
    }

    fn create_transform_summary(
        &self,
        reference: &Self,
        output: &Path,
        flags: &TransformFlags,
    ) -> Result<()> {
        let wide_output = wide(output.as_os_str())?;
        // SAFETY: both handles are live database handles and wide_output is
        // NUL-terminated.
        let code = unsafe {
            MsiCreateTransformSummaryInfoW(
                self.handle.raw(),
                reference.handle.raw(),
                wide_output.as_ptr(),
                flags.error_bits(),
                flags.validation_bits(),
            )
        };
        check("MsiCreateTransformSummaryInfo", code)
    }
}

/// A compiled query over a [`WindowsDatabase`].
#[derive(Debug)]
pub struct WindowsView<'db> {
    handle: Handle,
    /// Filled on first fetch
    streams: Option<StreamFields>,
    _database: PhantomData<&'db WindowsDatabase>,
}

impl WindowsView<'_> {
    fn column_info(&self, kind: i32) -> Result<Handle> {
        let mut raw: MSIHANDLE = 0;
        // SAFETY: handle is a live view handle.
        let code = unsafe { MsiViewGetColumnInfo(self.handle.raw(), kind, &mut raw) };
        check("MsiViewGetColumnInfo", code)?;
        Ok(Handle(raw))
    }
}

impl Drop for WindowsView<'_> {
    fn drop(&mut self) {
        // SAFETY: handle is a live view handle; closing releases the cursor
        // before the handle itself is closed by its guard.
        unsafe { MsiViewClose(self.handle.raw()) };
    }
}

impl View for WindowsView<'_> {
    fn execute(&mut self) -> Result<()> {
        // SAFETY: handle is a live view handle; 0 means no parameter record.
        let code = unsafe { MsiViewExecute(self.handle.raw(), 0) };
        check("MsiViewExecute", code)
    }

    fn columns(&self) -> Result<Vec<Column>> {
        let names = self.column_info(COLINFO_NAMES)?;
        let types = self.column_info(COLINFO_TYPES)?;
        (1..=field_count(&names))
            .map(|index| {
                Ok(Column {
                    index,
                    name: record_string(&names, index)?,
                    ty: record_string(&types, index)?,
                })
            })
            .collect()
    }

    fn fetch(&mut self) -> Result<Option<Row>> {
        if self.streams.is_none() {
            self.streams = Some(StreamFields::new(&self.columns()?));
        }

        let mut raw: MSIHANDLE = 0;
        // SAFETY: handle is a live, executed view handle.
        let code = unsafe { MsiViewFetch(self.handle.raw(), &mut raw) };
        match code {
            ERROR_SUCCESS => {}
            ERROR_NO_MORE_ITEMS => return Ok(None),
            code => return Err(Error::call("MsiViewFetch", code)),
        }
        let record = Handle(raw);

        let streams = self.streams.as_ref();
        (1..=field_count(&record))
            .map(|field| {
                let stream = streams.is_some_and(|s| s.contains(field));
                if stream || is_null(&record, field) {
                    Ok(None)
                } else {
                    record_string(&record, field).map(Some)
                }
            })
            .collect::<Result<Row>>()
            .map(Some)
    }
}
