/// Builds an [`InterfaceDesc`](crate::descriptor::InterfaceDesc) from a fixed
/// method table.
///
/// ```
/// use stubcall::interface_desc;
///
/// let desc = interface_desc! {
///     interface Echo ("stubcall/echo") {
///         method Echo(msg: "string") -> (value: "string");
///     }
/// };
/// assert_eq!(desc.methods[0].name, "Echo");
/// ```
#[macro_export]
macro_rules! interface_desc {
    (interface $name:ident ($pkg:literal) {
        $(method $method:ident
            ( $($in_name:ident : $in_typ:literal),* $(,)? )
            -> ( $($out_name:ident : $out_typ:literal),* $(,)? );
        )*
    }) => {
        $crate::descriptor::InterfaceDesc {
            name: stringify!($name).to_owned(),
            pkg_path: $pkg.to_owned(),
            methods: vec![
                $($crate::descriptor::MethodDesc {
                    name: stringify!($method).to_owned(),
                    in_args: vec![
                        $($crate::descriptor::ArgDesc::new(stringify!($in_name), $in_typ)),*
                    ],
                    out_args: vec![
                        $($crate::descriptor::ArgDesc::new(stringify!($out_name), $out_typ)),*
                    ],
                }),*
            ],
        }
    };
}
