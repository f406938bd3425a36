//! Shared plumbing for the per-ISA kernel entry points.
//!
//! `generate_hmm_entry!` emits a thin `#[target_feature]` wrapper around the
//! generic striped kernel, pairing one engine type with its lane count and
//! the global context of its precision. The wrapper is what runtime dispatch
//! stores as a function pointer, and the attribute is what licenses the
//! engine's intrinsics inside the monomorphized kernel body.

#[macro_export]
macro_rules! generate_hmm_entry {
    (
        name = $name:ident,
        lanes = $lanes:expr,
        engine = $engine:ty,
        elem = $elem:ty,
        context = $context:ident,
        cfg = $cfg:meta,
        target_feature = $tf:literal,
    ) => {
        #[$cfg]
        #[target_feature(enable = $tf)]
        #[allow(unsafe_op_in_unsafe_fn)]
        pub unsafe fn $name(tc: &$crate::hmm::testcase::Testcase) -> $elem {
            $crate::hmm::kernel::forward_kernel::<{ $lanes }, $engine>(
                tc,
                &$crate::hmm::context::$context,
            )
        }
    };
}
