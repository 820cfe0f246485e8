//! Small conveniences for writing output files.

#[doc(hidden)]
pub use ndarray_npy as __npy;

/// Create a directory and all of its parents if they don't already exist,
/// evaluating to a `std::io::Result<()>`.
#[macro_export]
macro_rules! mkdir {
    ( $path:expr ) => {
        std::fs::create_dir_all($path)
    }
}

/// Write a series of arrays to a `.npz` file under the given names, evaluating
/// to a [`MEResult<()>`][crate::error::MEResult].
///
/// ```ignore
/// write_npz!(
///     outdir.join("data.npz"),
///     arrays: {
///         "time" => &time,
///         "rho" => &rho,
///     }
/// )?;
/// ```
#[macro_export]
macro_rules! write_npz {
    (
        $filename:expr,
        arrays: { $( $key:expr => $arr:expr ),+ $(,)? } $(,)?
    ) => {
        (|| -> $crate::error::MEResult<()> {
            let mut _npz_
                = $crate::utils::__npy::NpzWriter::new(
                    std::fs::File::create($filename)?);
            $(
                _npz_.add_array($key, $arr)?;
            )+
            _npz_.finish()?;
            Ok(())
        })()
    }
}
