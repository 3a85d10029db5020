use std::collections::HashMap;
use std::mem;
use std::ptr;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::{Mutex, Once};

use once_cell::sync::Lazy;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HANDLE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, BitBlt, CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, EndPaint,
    InvalidateRect, SelectObject, UpdateWindow, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
    DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ, PAINTSTRUCT, SRCCOPY,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRect, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetWindowLongPtrW, GetWindowRect, LoadCursorW, PeekMessageW, RegisterClassW,
    SetWindowLongPtrW, SetWindowPos, SetWindowTextW, ShowWindow, SystemParametersInfoW,
    TranslateMessage, GWLP_USERDATA, IDC_ARROW, MSG, PM_REMOVE, SPI_GETWORKAREA,
    SWP_NOACTIVATE, SWP_NOSIZE, SWP_NOZORDER, SW_SHOW, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
    WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_ERASEBKGND, WM_LBUTTONDOWN, WM_MOUSEMOVE,
    WM_PAINT, WM_RBUTTONDOWN, WNDCLASSW, WS_CAPTION, WS_MINIMIZEBOX, WS_OVERLAPPED, WS_SYSMENU,
};

use crate::drawer::buffer::{convert_rgba_to_dib_bgra, RgbaBuffer};
use crate::drawer::error::{DrawerError, Result};
use crate::drawer::model::Point;
use crate::drawer::window::{DrawerWindow, WindowConfig, WindowEvent};

const CLASS_NAME: &str = "GdiDrawerWindow";

static EVENT_SENDERS: Lazy<Mutex<HashMap<isize, Sender<WindowEvent>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn widestring(value: &str) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    std::ffi::OsStr::new(value)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

fn window_style() -> WINDOW_STYLE {
    WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU | WS_MINIMIZEBOX
}

fn send_event(hwnd: HWND, event: WindowEvent) {
    if let Ok(senders) = EVENT_SENDERS.lock() {
        if let Some(tx) = senders.get(&(hwnd.0 as isize)) {
            let _ = tx.send(event);
        }
    }
}

fn pointer_from_lparam(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xffff) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xffff) as i16 as i32;
    Point::new(x, y)
}

unsafe extern "system" fn drawer_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
            if !hdc.0.is_null() {
                let mem_dc = HDC(unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut _);
                if !mem_dc.0.is_null() {
                    let _ = unsafe {
                        BitBlt(
                            hdc,
                            ps.rcPaint.left,
                            ps.rcPaint.top,
                            ps.rcPaint.right - ps.rcPaint.left,
                            ps.rcPaint.bottom - ps.rcPaint.top,
                            mem_dc,
                            ps.rcPaint.left,
                            ps.rcPaint.top,
                            SRCCOPY,
                        )
                    };
                }
            }
            unsafe {
                let _ = EndPaint(hwnd, &ps);
            }
            send_event(hwnd, WindowEvent::Painted);
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            send_event(hwnd, WindowEvent::PointerMoved(pointer_from_lparam(lparam)));
            LRESULT(0)
        }
        WM_LBUTTONDOWN => {
            send_event(hwnd, WindowEvent::LeftButtonDown(pointer_from_lparam(lparam)));
            LRESULT(0)
        }
        WM_RBUTTONDOWN => {
            send_event(hwnd, WindowEvent::RightButtonDown(pointer_from_lparam(lparam)));
            LRESULT(0)
        }
        // The presenter tears the window down itself once it sees the request.
        WM_CLOSE => {
            send_event(hwnd, WindowEvent::CloseRequested);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Fixed-size captioned window presenting a 32bpp top-down DIB section.
#[derive(Debug)]
pub struct Win32Window {
    hwnd: HWND,
    mem_dc: HDC,
    dib: HBITMAP,
    old_bitmap: HGDIOBJ,
    bits: *mut u8,
    size_bytes: usize,
    width: u32,
    height: u32,
    events_rx: Receiver<WindowEvent>,
    closed: bool,
}

impl Win32Window {
    /// Creates the window at the bottom-right of the primary work area.
    pub fn create(config: &WindowConfig) -> Result<Self> {
        static REGISTER_CLASS: Once = Once::new();
        let class_name = widestring(CLASS_NAME);
        let title = widestring(&config.title);
        let hinstance = unsafe { GetModuleHandleW(PCWSTR::null()) }
            .map_err(|err| DrawerError::Window(format!("module handle unavailable: {err}")))?;

        REGISTER_CLASS.call_once(|| unsafe {
            let wc = WNDCLASSW {
                hInstance: hinstance.into(),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                lpfnWndProc: Some(drawer_wndproc),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                ..Default::default()
            };
            let _ = RegisterClassW(&wc);
        });

        let mut frame = RECT {
            left: 0,
            top: 0,
            right: config.width as i32,
            bottom: config.height as i32,
        };
        unsafe {
            let _ = AdjustWindowRect(&mut frame, window_style(), false);
        }
        let outer_width = frame.right - frame.left;
        let outer_height = frame.bottom - frame.top;

        let mut work_area = RECT::default();
        let origin = unsafe {
            SystemParametersInfoW(
                SPI_GETWORKAREA,
                0,
                Some(&mut work_area as *mut RECT as *mut _),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
        }
        .map(|_| {
            (
                (work_area.right - outer_width).max(work_area.left),
                (work_area.bottom - outer_height).max(work_area.top),
            )
        })
        .unwrap_or((0, 0));

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                window_style(),
                origin.0,
                origin.1,
                outer_width,
                outer_height,
                None,
                None,
                hinstance,
                None,
            )
        }
        .map_err(|err| DrawerError::Window(format!("CreateWindowExW failed: {err}")))?;

        let mem_dc = unsafe { CreateCompatibleDC(HDC::default()) };
        if mem_dc.0.is_null() {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            return Err(DrawerError::Window("CreateCompatibleDC failed".to_string()));
        }

        let mut bmi = BITMAPINFO::default();
        bmi.bmiHeader = BITMAPINFOHEADER {
            biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: config.width as i32,
            biHeight: -(config.height as i32),
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        };

        let mut bits: *mut core::ffi::c_void = ptr::null_mut();
        let dib = unsafe {
            CreateDIBSection(mem_dc, &bmi, DIB_RGB_COLORS, &mut bits, HANDLE::default(), 0)
        };
        let dib = match dib {
            Ok(dib) if !bits.is_null() => dib,
            _ => {
                unsafe {
                    let _ = DeleteDC(mem_dc);
                    let _ = DestroyWindow(hwnd);
                }
                return Err(DrawerError::Window("CreateDIBSection failed".to_string()));
            }
        };

        let old_bitmap = unsafe { SelectObject(mem_dc, dib) };
        unsafe {
            let _ = SetWindowLongPtrW(hwnd, GWLP_USERDATA, mem_dc.0 as isize);
        }

        let (events_tx, events_rx) = channel::<WindowEvent>();
        if let Ok(mut senders) = EVENT_SENDERS.lock() {
            senders.insert(hwnd.0 as isize, events_tx);
        }

        let size_bytes = (config.width as usize)
            .saturating_mul(config.height as usize)
            .saturating_mul(4);
        let mut window = Self {
            hwnd,
            mem_dc,
            dib,
            old_bitmap,
            bits: bits as *mut u8,
            size_bytes,
            width: config.width,
            height: config.height,
            events_rx,
            closed: false,
        };
        window.present(&RgbaBuffer::new(config.width, config.height, config.background))?;
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
        }
        Ok(window)
    }

    fn pump_messages() {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).into() {
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            }
        }
    }

    fn window_rect(&self) -> Option<RECT> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(self.hwnd, &mut rect) }.ok()?;
        Some(rect)
    }
}

impl DrawerWindow for Win32Window {
    fn pump_events(&mut self) -> Vec<WindowEvent> {
        Self::pump_messages();
        let mut events = Vec::new();
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    fn present(&mut self, frame: &RgbaBuffer) -> Result<()> {
        if self.closed || self.bits.is_null() {
            return Err(DrawerError::Window("window surface is gone".to_string()));
        }
        if frame.width() != self.width || frame.height() != self.height {
            return Err(DrawerError::Window(format!(
                "frame {}x{} does not match window {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        let dib = unsafe { std::slice::from_raw_parts_mut(self.bits, self.size_bytes) };
        convert_rgba_to_dib_bgra(frame.pixels(), dib);
        unsafe {
            let _ = InvalidateRect(self.hwnd, None, false);
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        let title = widestring(title);
        unsafe {
            let _ = SetWindowTextW(self.hwnd, PCWSTR(title.as_ptr()));
        }
    }

    fn position(&self) -> Option<Point> {
        self.window_rect().map(|rect| Point::new(rect.left, rect.top))
    }

    fn set_position(&mut self, position: Point) -> Result<()> {
        unsafe {
            SetWindowPos(
                self.hwnd,
                HWND::default(),
                position.x,
                position.y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .map_err(|err| DrawerError::Window(format!("SetWindowPos failed: {err}")))
    }

    fn outer_size(&self) -> Option<(i32, i32)> {
        self.window_rect()
            .map(|rect| (rect.right - rect.left, rect.bottom - rect.top))
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Ok(mut senders) = EVENT_SENDERS.lock() {
            senders.remove(&(self.hwnd.0 as isize));
        }
        unsafe {
            let _ = SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            if !self.mem_dc.0.is_null() {
                let _ = SelectObject(self.mem_dc, self.old_bitmap);
            }
            if !self.dib.0.is_null() {
                let _ = DeleteObject(self.dib);
            }
            if !self.mem_dc.0.is_null() {
                let _ = DeleteDC(self.mem_dc);
            }
            let _ = DestroyWindow(self.hwnd);
        }
        self.bits = ptr::null_mut();
        Self::pump_messages();
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        self.shutdown();
    }
}
