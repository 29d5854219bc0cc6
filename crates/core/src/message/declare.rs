// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Declare the whole message catalogue at once.
///
/// For every variant this generates a payload struct, a `Body` variant
/// serialized under its wire tag, `From<Payload> for Body` and a
/// [`Matches`](super::Matches) impl narrowing to the payload. For every
/// family it generates a `Family` variant and a marker type whose
/// `Matches` impl accepts exactly the family's members, so family
/// predicates cannot drift from the catalogue.
macro_rules! declare_messages {
    (
        $(
            $(#[$family_meta:meta])*
            family $family:ident => $marker:ident ($family_tag:literal) {
                $(
                    $(#[$meta:meta])*
                    $variant:ident = $tag:literal {
                        $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
                    }
                )*
            }
        )*
    ) => {
        $($(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
            pub struct $variant {
                $( $(#[$field_meta])* pub $field: $ty, )*
            }

            impl From<$variant> for Body {
                fn from(payload: $variant) -> Self {
                    Body::$variant(payload)
                }
            }

            impl super::Matches for $variant {
                type Target = $variant;

                fn narrow(message: &super::Message) -> Option<&$variant> {
                    match &message.body {
                        Body::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }
            }
        )*)*

        $(
            $(#[$family_meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $marker;

            impl super::Matches for $marker {
                type Target = super::Message;

                fn narrow(message: &super::Message) -> Option<&super::Message> {
                    let member = false $( || <$variant as super::Matches>::is(message) )*;
                    member.then_some(message)
                }
            }
        )*

        /// Every message payload, tagged on the wire by `type`.
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(tag = "type")]
        pub enum Body {
            $($(
                #[serde(rename = $tag)]
                $variant($variant),
            )*)*
        }

        impl Body {
            /// Wire tag, e.g. `vcs:clone-end`.
            pub fn name(&self) -> &'static str {
                match self {
                    $($( Body::$variant(_) => $tag, )*)*
                }
            }

            pub fn family(&self) -> Family {
                match self {
                    $($( Body::$variant(_) => Family::$family, )*)*
                }
            }
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Family {
            $( $family, )*
        }

        impl Family {
            pub const ALL: &'static [Family] = &[ $( Family::$family, )* ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Family::$family => $family_tag, )*
                }
            }

            /// Wire tags of every member, in declaration order.
            pub fn members(&self) -> &'static [&'static str] {
                match self {
                    $( Family::$family => &[ $( $tag, )* ], )*
                }
            }

            pub fn contains(&self, message: &super::Message) -> bool {
                match self {
                    $( Family::$family => <$marker as super::Matches>::is(message), )*
                }
            }
        }

        impl std::fmt::Display for Family {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        /// One default-valued instance of every variant, for exhaustive tests.
        #[cfg(any(test, feature = "test-support"))]
        pub fn every_body() -> Vec<Body> {
            vec![ $($( Body::$variant(<$variant>::default()), )*)* ]
        }
    };
}
