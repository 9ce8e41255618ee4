// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::{cell::Cell, cell::UnsafeCell, mem::MaybeUninit};

pub use critical_section::{CriticalSection, Mutex};

macro_rules! define_context {
    ($name:ident) => {
        pub struct $name<'cs>(CriticalSection<'cs>);

        impl<'cs> $name<'cs> {
            /// Create a new context.
            ///
            /// # SAFETY
            ///
            /// This may only be called from the corresponding context.
            /// `MainCtx` may only be constructed from `main()`
            /// and `IrqCtx` may only be constructed from the tick ISR.
            #[inline(always)]
            pub unsafe fn new() -> Self {
                // SAFETY: The tick ISR is the only interrupt of the system
                //         and it runs with interrupt delivery disabled.
                //         Therefore, all state reached through an `IrqCtx`
                //         is accessed exclusively.
                //
                //         The `MainCtx` only accesses `MutexCell`s before
                //         interrupts are enabled. After that `main()` is idle.
                let cs = unsafe { CriticalSection::new() };
                fence();
                Self(cs)
            }

            /// Get the `CriticalSection` that belongs to this context.
            #[inline(always)]
            pub fn cs(&self) -> CriticalSection<'cs> {
                self.0
            }
        }

        impl Drop for $name<'_> {
            #[inline(always)]
            fn drop(&mut self) {
                fence();
            }
        }
    };
}

define_context!(MainCtx);
define_context!(IrqCtx);

/// Main context initialization marker.
///
/// This marker does not have a pub constructor.
/// It is only created by [MainCtx].
pub struct MainInitCtx(());

impl MainInitCtx {
    /// Initialization runs with interrupts disabled.
    #[inline(always)]
    pub fn cs(&self) -> CriticalSection<'_> {
        // SAFETY: A `MainInitCtx` only exists during construction of
        //         the `MainCtx`, which happens before interrupts are enabled.
        unsafe { CriticalSection::new() }
    }
}

impl<'cs> MainCtx<'cs> {
    /// # SAFETY
    ///
    /// The safety contract of [MainCtx::new] must be upheld.
    /// Interrupts must be disabled while this runs.
    #[inline(always)]
    pub unsafe fn new_with_init<F: FnOnce(&MainInitCtx)>(f: F) -> Self {
        f(&MainInitCtx(()));
        // SAFETY: Safety contract of MainCtx::new is upheld by our caller.
        unsafe { Self::new() }
    }
}

pub mod interrupt {
    use super::CriticalSection;

    /// Run `f` with interrupt delivery disabled.
    ///
    /// The previous interrupt enable state is restored afterwards.
    /// Keep `f` short. It blocks the tick for its whole duration.
    #[inline(always)]
    pub fn free<F, R>(f: F) -> R
    where
        F: FnOnce(CriticalSection<'_>) -> R,
    {
        critical_section::with(f)
    }
}

/// Lazy initialization of static variables.
pub struct LazyMainInit<T>(UnsafeCell<MaybeUninit<T>>);

impl<T> LazyMainInit<T> {
    /// # SAFETY
    ///
    /// It must be ensured that the returned instance is initialized
    /// with a call to [Self::init] during construction of the [MainCtx].
    /// See [MainCtx::new_with_init].
    ///
    /// Using this object in any way before initializing it will
    /// result in Undefined Behavior.
    #[inline(always)]
    pub const unsafe fn uninit() -> Self {
        Self(UnsafeCell::new(MaybeUninit::uninit()))
    }

    #[inline(always)]
    pub fn init(&self, _m: &MainInitCtx, inner: T) {
        // SAFETY: Interrupts are disabled during MainInitCtx.
        //         Nobody else can hold a reference to the inner value yet.
        unsafe { *self.0.get() = MaybeUninit::new(inner) };
    }

    #[inline(always)]
    pub fn deref<'a>(&'a self, _m: &MainCtx<'_>) -> &'a T {
        // SAFETY: the `Self::uninit` safety contract ensures that `Self::init` is called before us.
        unsafe { (*self.0.get()).assume_init_ref() }
    }

    #[inline(always)]
    pub fn deref_irq<'a>(&'a self, _c: &IrqCtx<'_>) -> &'a T {
        // SAFETY: the `Self::uninit` safety contract ensures that `Self::init` is called before us.
        //         Interrupts are only enabled after the MainCtx has been constructed.
        unsafe { (*self.0.get()).assume_init_ref() }
    }
}

// SAFETY: The object only contains T state.
unsafe impl<T: Send> Send for LazyMainInit<T> {}

// SAFETY: Write access only happens through `init` with interrupts disabled.
//         After that the inner value is only handed out through `deref`
//         and `deref_irq`, which require a context token.
//         `main()` stops using the inner value once interrupts are enabled.
unsafe impl<T> Sync for LazyMainInit<T> {}

/// Optimization and reordering fence.
#[inline(always)]
pub fn fence() {
    core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
}

/// Interrupt context owned state cell.
///
/// Every task of the scheduler owns its state in `MutexCell`s.
/// Access requires the [IrqCtx] token, so the state can only be touched
/// from the tick ISR that owns it.
pub struct MutexCell<T> {
    inner: Mutex<Cell<T>>,
}

impl<T> MutexCell<T> {
    #[inline]
    pub const fn new(inner: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(inner)),
        }
    }

    #[inline]
    pub fn replace(&self, c: &IrqCtx<'_>, inner: T) -> T {
        self.inner.borrow(c.cs()).replace(inner)
    }
}

impl<T: Copy> MutexCell<T> {
    #[inline]
    pub fn get(&self, c: &IrqCtx<'_>) -> T {
        self.inner.borrow(c.cs()).get()
    }

    #[inline]
    pub fn set(&self, c: &IrqCtx<'_>, inner: T) {
        self.inner.borrow(c.cs()).set(inner);
    }
}

/// Cheaper Option::unwrap() alternative.
///
/// This is cheaper, because it doesn't call into the panic unwind path.
/// Therefore, it does not impose caller-saves overhead onto the calling function.
#[inline(always)]
pub fn unwrap_option<T>(value: Option<T>) -> T {
    match value {
        Some(value) => value,
        None => reset_system(),
    }
}

/// Reset the system.
#[inline(always)]
#[allow(clippy::empty_loop)]
pub fn reset_system() -> ! {
    loop {
        // Wait for the watchdog timer to trigger and reset the system.
        // main() does not run anymore, so nobody pokes the watchdog.
    }
}


// vim: ts=4 sw=4 expandtab
