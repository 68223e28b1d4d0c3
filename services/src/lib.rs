pub mod attendance_session;

pub use attendance_session::{
    AttendanceSession, Liveness, SessionError, SessionKey, SessionRegistry, render_qr_png,
};
